/*!
 * Dispatch Module
 * Submission API, the serialized dispatch loop, and the scheduler seam
 */

pub mod dispatcher;
pub(crate) mod queue_core;
pub mod scheduler;

// Re-export public API
pub use dispatcher::Dispatcher;
pub use scheduler::{DrainHandle, Scheduler, ThreadScheduler};
