/*!
 * Core Module
 * Shared errors, limits, and configuration for the dispatch subsystem
 */

pub mod config;
pub mod errors;
pub mod limits;

// Re-export public API
pub use config::DispatchConfig;
pub use errors::{SubmitError, SubmitResult};
pub use limits::{DEFAULT_QUEUE_CAPACITY, MIN_QUEUE_CAPACITY, RESULT_ABORTED};
