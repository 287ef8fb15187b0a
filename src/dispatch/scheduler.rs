/*!
 * Scheduler
 *
 * The "kick" seam between producers and the dispatch loop. The dispatcher
 * only requires a notify primitive: after `notify()` returns, the loop must
 * run to empty at least once at some point afterward, and notifications
 * issued before that run starts may collapse into a single run.
 *
 * `ThreadScheduler` is the stock implementation: a dedicated consumer
 * thread woken through a one-slot channel, so redundant kicks coalesce and
 * exactly one drain ever runs at a time.
 */

use crate::dispatch::queue_core::DispatchCore;
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::debug;

/// Consumer-side handle a scheduler drives the dispatch loop with
#[derive(Clone)]
pub struct DrainHandle {
    core: Arc<DispatchCore>,
}

impl DrainHandle {
    pub(crate) fn new(core: Arc<DispatchCore>) -> Self {
        Self { core }
    }

    /// Run the dispatch loop until the queue is empty
    ///
    /// Must never be invoked concurrently with itself; the scheduler owns
    /// that serialization (a single consumer thread, a coalescing softirq,
    /// and so on). Targets executed here run strictly one at a time.
    pub fn run(&self) {
        self.core.drain();
    }

    /// Whether teardown has begun and the consumer should stop
    pub fn is_shut_down(&self) -> bool {
        self.core.is_shutting_down()
    }

    /// Non-blocking check for queued work
    ///
    /// Advisory only; `run` already returns immediately on an empty queue.
    pub fn has_work(&self) -> bool {
        self.core.has_work()
    }
}

/// Host-supplied wakeup primitive for the dispatch loop
pub trait Scheduler: Send + Sync {
    /// Request a run of the dispatch loop
    ///
    /// Contract: the loop drains to empty at least once after this call;
    /// repeated notifications before that run starts may be coalesced.
    /// Must be callable from producer contexts that may never block.
    fn notify(&self);

    /// Quiesce the consumer during teardown
    ///
    /// Called after the shutdown flag is set and a final `notify()` was
    /// issued; must not return while a drain is still executing targets.
    fn stop(&self) {}
}

/// Dedicated consumer thread woken by a one-slot kick channel
///
/// A full channel means a run is already pending, so `try_send` failure is
/// exactly the coalescing the notify contract allows.
pub struct ThreadScheduler {
    kick_tx: flume::Sender<()>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ThreadScheduler {
    /// Spawn the consumer thread for `handle`
    pub fn spawn(handle: DrainHandle) -> Self {
        let (kick_tx, kick_rx) = flume::bounded::<()>(1);

        let worker = thread::spawn(move || {
            while kick_rx.recv().is_ok() {
                if handle.is_shut_down() {
                    break;
                }
                handle.run();
            }
            debug!("dispatch loop thread stopped");
        });

        Self {
            kick_tx,
            worker: Mutex::new(Some(worker)),
        }
    }
}

impl Scheduler for ThreadScheduler {
    fn notify(&self) {
        // Full channel: a kick is already pending, coalesce
        let _ = self.kick_tx.try_send(());
    }

    fn stop(&self) {
        if let Some(worker) = self.worker.lock().take() {
            let _ = worker.join();
        }
    }
}
