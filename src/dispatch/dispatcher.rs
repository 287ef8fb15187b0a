/*!
 * Dispatcher
 *
 * Producer-facing surface: fire-and-forget and block-for-result submission
 * over one bounded FIFO ring drained by one serialized consumer. Clones
 * share the same queue and loop, so collaborators receive a `Dispatcher`
 * instead of reaching for process-wide state.
 */

use crate::core::config::DispatchConfig;
use crate::core::errors::{SubmitError, SubmitResult};
use crate::dispatch::queue_core::DispatchCore;
use crate::dispatch::scheduler::{DrainHandle, Scheduler, ThreadScheduler};
use crate::queue::stats::DispatchStats;
use crate::task::completion::Completion;
use crate::task::slot::TaskSlot;
use crate::task::target::{TaskCode, TaskTarget};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Handle to a serialized deferred-execution dispatcher
///
/// Cheap to clone; all clones feed the same work queue. Submissions are
/// executed in the exact order their enqueues completed, across all
/// producers.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    core: Arc<DispatchCore>,
    scheduler: Box<dyn Scheduler>,
    torn_down: AtomicBool,
}

impl Dispatcher {
    /// Create a dispatcher with a dedicated consumer thread
    pub fn new(config: DispatchConfig) -> Self {
        Self::with_scheduler(config, ThreadScheduler::spawn)
    }

    /// Create a dispatcher driven by a host-supplied scheduler
    ///
    /// `make` receives the drain handle the scheduler must serialize; see
    /// the `Scheduler` contract.
    pub fn with_scheduler<S, F>(config: DispatchConfig, make: F) -> Self
    where
        S: Scheduler + 'static,
        F: FnOnce(DrainHandle) -> S,
    {
        let core = Arc::new(DispatchCore::new(config.effective_capacity()));
        let scheduler = Box::new(make(DrainHandle::new(core.clone())));
        info!(capacity = config.effective_capacity(), "dispatcher initialized");
        Self {
            inner: Arc::new(DispatcherInner {
                core,
                scheduler,
                torn_down: AtomicBool::new(false),
            }),
        }
    }

    /// Enqueue work and return immediately
    ///
    /// A non-empty payload is duplicated up front and owned by the slot, so
    /// the caller is free to reuse its buffer before the target runs; the
    /// target's eventual return code is not observable here by design.
    /// Never blocks; safe from producer contexts that must not sleep.
    pub fn submit_async(
        &self,
        target: Arc<dyn TaskTarget>,
        arg: i32,
        payload: Option<&[u8]>,
    ) -> SubmitResult<()> {
        let payload = duplicate_payload(payload)?;
        self.enqueue_and_kick(TaskSlot::new(target, arg, payload))
    }

    /// Enqueue work and block until the target has run, returning its code
    ///
    /// Blocks only on this submission's own slot, never on another
    /// caller's. Released either by normal execution or by teardown, which
    /// delivers [`RESULT_ABORTED`](crate::core::limits::RESULT_ABORTED) to
    /// signal "queued but never run". On a full queue the call fails
    /// immediately without blocking.
    pub fn submit_sync(
        &self,
        target: Arc<dyn TaskTarget>,
        arg: i32,
        payload: Option<&[u8]>,
    ) -> SubmitResult<TaskCode> {
        let payload = duplicate_payload(payload)?;
        let completion = Arc::new(Completion::new());
        self.enqueue_and_kick(TaskSlot::with_completion(
            target,
            arg,
            payload,
            completion.clone(),
        ))?;
        Ok(completion.wait())
    }

    /// Point-in-time counters and queue depth
    pub fn stats(&self) -> DispatchStats {
        self.inner.core.stats()
    }

    /// Drain and release all queued work without executing it
    ///
    /// Every blocked synchronous submitter is released with the aborted
    /// sentinel and every payload duplicate is freed; no caller is left
    /// waiting. Idempotent, and also performed when the last clone drops.
    /// Must not be called from inside a task target (the consumer cannot
    /// join itself).
    pub fn shutdown(&self) {
        self.inner.teardown();
    }

    fn enqueue_and_kick(&self, slot: TaskSlot) -> SubmitResult<()> {
        self.inner.core.try_enqueue(slot)?;
        self.inner.scheduler.notify();
        Ok(())
    }
}

impl DispatcherInner {
    fn teardown(&self) {
        if self.torn_down.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!("dispatcher teardown started");
        self.core.begin_shutdown();
        // Final kick so a parked consumer observes the flag, then wait the
        // consumer out before releasing what it left behind
        self.scheduler.notify();
        self.scheduler.stop();
        self.core.abort_drain();
        debug!("dispatcher teardown complete");
    }
}

impl Drop for DispatcherInner {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Copy the caller's buffer so the slot outlives the call
///
/// Fallible allocation: on failure the submission aborts with
/// `OutOfMemory` before the queue is touched. Empty payloads are passed as
/// `None`, uncopied.
fn duplicate_payload(payload: Option<&[u8]>) -> SubmitResult<Option<Vec<u8>>> {
    match payload {
        Some(bytes) if !bytes.is_empty() => {
            let mut copy = Vec::new();
            copy.try_reserve_exact(bytes.len())
                .map_err(|_| SubmitError::OutOfMemory)?;
            copy.extend_from_slice(bytes);
            Ok(Some(copy))
        }
        _ => Ok(None),
    }
}
