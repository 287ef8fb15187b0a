/*!
 * Dispatch Core
 *
 * The serialized consumer side: drains the task ring to empty, one item at
 * a time, in enqueue order. There is no run queue snapshot; the ring is
 * re-checked after every item so work submitted mid-run is picked up by the
 * same run ("drain to empty", not "drain what existed at kick time").
 */

use crate::core::errors::{SubmitError, SubmitResult};
use crate::core::limits::RESULT_ABORTED;
use crate::queue::ring::TaskRing;
use crate::queue::stats::{AtomicDispatchStats, DispatchStats};
use crate::task::slot::TaskSlot;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

/// Shared state between producers, the consumer, and teardown
pub(crate) struct DispatchCore {
    ring: TaskRing,
    stats: AtomicDispatchStats,
    /// Set once teardown begins; the dispatch loop stops executing targets
    shutdown: AtomicBool,
}

impl DispatchCore {
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: TaskRing::new(capacity),
            stats: AtomicDispatchStats::new(),
            shutdown: AtomicBool::new(false),
        }
    }

    /// Producer side: append a slot, tallying back-pressure
    pub fn try_enqueue(&self, slot: TaskSlot) -> SubmitResult<()> {
        match self.ring.try_enqueue(slot) {
            Ok(()) => {
                self.stats.inc_submitted();
                Ok(())
            }
            Err(SubmitError::QueueFull) => {
                self.stats.inc_rejected();
                warn!(
                    capacity = self.ring.capacity(),
                    "work queue full, rejecting submission"
                );
                Err(SubmitError::QueueFull)
            }
            Err(err) => Err(err),
        }
    }

    /// Run queued targets until the ring is empty or teardown begins
    ///
    /// Per item: execute the target, signal a blocked synchronous submitter
    /// with its return code, then drop the slot (releasing the payload
    /// duplicate exactly once). A target's non-zero code is its own
    /// business, never a dispatcher failure.
    pub fn drain(&self) {
        loop {
            if self.shutdown.load(Ordering::Acquire) {
                // Leave the remainder for the teardown drain
                break;
            }
            let Some(slot) = self.ring.take_next() else {
                break;
            };

            let TaskSlot {
                target,
                arg,
                payload,
                completion,
            } = slot;

            let code = target.run(arg, payload.as_deref());
            if let Some(completion) = completion {
                completion.signal(code);
            }
            self.stats.inc_executed();
        }
    }

    /// Teardown drain: release every remaining slot without executing it
    ///
    /// Blocked synchronous submitters get the aborted sentinel; payload
    /// duplicates are dropped. The only path that completes a slot without
    /// running its target.
    pub fn abort_drain(&self) {
        while let Some(slot) = self.ring.take_next() {
            if let Some(completion) = slot.completion {
                completion.signal(RESULT_ABORTED);
            }
            self.stats.inc_aborted();
        }
    }

    /// Flag teardown and close the ring to new submissions
    pub fn begin_shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
        self.ring.close();
    }

    #[inline]
    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    #[inline]
    pub fn has_work(&self) -> bool {
        self.ring.has_work()
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats.snapshot(self.ring.len(), self.ring.capacity())
    }
}
