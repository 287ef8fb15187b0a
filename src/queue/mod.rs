/*!
 * Queue Module
 * Bounded MPSC ring buffer of task slots plus dispatch counters
 */

pub(crate) mod ring;
pub mod stats;

// Re-export public API
pub use stats::DispatchStats;
