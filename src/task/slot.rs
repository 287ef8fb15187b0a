/*!
 * Task Slot
 * One unit of deferred work plus its result-delivery bookkeeping
 */

use crate::task::completion::Completion;
use crate::task::target::TaskTarget;
use std::sync::Arc;

/// A queued unit of work
///
/// Transient: populated at submission time, removed from the ring and
/// dropped immediately after execution (or teardown-draining). The payload
/// is always a dispatcher-owned duplicate of the submitter's buffer, so no
/// borrowed data ever crosses onto the consumer thread; dropping the slot
/// releases it exactly once.
pub(crate) struct TaskSlot {
    pub target: Arc<dyn TaskTarget>,
    pub arg: i32,
    pub payload: Option<Vec<u8>>,
    /// Present iff a producer is blocked in a synchronous submission
    pub completion: Option<Arc<Completion>>,
}

impl TaskSlot {
    /// Slot for a fire-and-forget submission
    pub fn new(target: Arc<dyn TaskTarget>, arg: i32, payload: Option<Vec<u8>>) -> Self {
        Self {
            target,
            arg,
            payload,
            completion: None,
        }
    }

    /// Slot whose submitter blocks on `completion` until it is processed
    pub fn with_completion(
        target: Arc<dyn TaskTarget>,
        arg: i32,
        payload: Option<Vec<u8>>,
        completion: Arc<Completion>,
    ) -> Self {
        Self {
            target,
            arg,
            payload,
            completion: Some(completion),
        }
    }
}
