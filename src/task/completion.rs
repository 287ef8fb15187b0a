/*!
 * Completion Handle
 *
 * One-shot signal a blocked synchronous submitter waits on. Signaled
 * exactly once, either by the dispatch loop with the target's return code
 * or by teardown with the aborted sentinel; later signals are ignored so
 * the first result always wins.
 */

use crate::task::target::TaskCode;
use parking_lot::{Condvar, Mutex};

/// One-shot completion carrying the task's result code
pub struct Completion {
    result: Mutex<Option<TaskCode>>,
    condvar: Condvar,
}

impl Completion {
    /// Create an unsignaled completion
    pub fn new() -> Self {
        Self {
            result: Mutex::new(None),
            condvar: Condvar::new(),
        }
    }

    /// Deliver the result and wake the waiter
    ///
    /// One-shot: a second signal is a no-op.
    pub fn signal(&self, code: TaskCode) {
        let mut result = self.result.lock();
        if result.is_none() {
            *result = Some(code);
            self.condvar.notify_one();
        }
    }

    /// Block the calling thread until the result is delivered
    pub fn wait(&self) -> TaskCode {
        let mut result = self.result.lock();
        loop {
            if let Some(code) = *result {
                return code;
            }
            self.condvar.wait(&mut result);
        }
    }

    /// Non-blocking probe of the delivered result
    pub fn try_result(&self) -> Option<TaskCode> {
        *self.result.lock()
    }
}

impl Default for Completion {
    fn default() -> Self {
        Self::new()
    }
}
