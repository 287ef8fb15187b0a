/*!
 * Task Module
 * Units of deferred work: the callable seam, the queued slot, and the
 * one-shot completion a synchronous submitter blocks on
 */

pub mod completion;
pub(crate) mod slot;
pub mod target;

// Re-export public API
pub use completion::Completion;
pub use target::{TaskCode, TaskTarget};
