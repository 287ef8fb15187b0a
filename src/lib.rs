/*!
 * dispatchq
 *
 * Serialized deferred-execution dispatcher: any number of concurrent
 * producers (including contexts that must never block) hand work to a
 * bounded FIFO ring drained by exactly one consumer. Submissions are
 * fire-and-forget or block-for-result; teardown releases every queued slot
 * and can never leave a blocked submitter waiting.
 */

pub mod core;
pub mod dispatch;
pub mod queue;
pub mod task;

// Re-exports
pub use crate::core::{
    DispatchConfig, SubmitError, SubmitResult, DEFAULT_QUEUE_CAPACITY, MIN_QUEUE_CAPACITY,
    RESULT_ABORTED,
};
pub use dispatch::{Dispatcher, DrainHandle, Scheduler, ThreadScheduler};
pub use queue::DispatchStats;
pub use task::{TaskCode, TaskTarget};
