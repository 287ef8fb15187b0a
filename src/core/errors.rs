/*!
 * Error Types
 * Submission errors with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias for submission operations
pub type SubmitResult<T> = Result<T, SubmitError>;

/// Errors returned synchronously to a submitter
///
/// All dispatcher-level failures surface here, at submission time. Nothing
/// is retried or logged-and-swallowed internally; retry policy belongs to
/// the caller.
#[derive(Error, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", rename_all = "snake_case")]
pub enum SubmitError {
    #[error("work queue is full")]
    #[diagnostic(
        code(dispatch::queue_full),
        help("Back-pressure signal, expected under load. Retry after the dispatch loop drains.")
    )]
    QueueFull,

    #[error("payload duplication failed")]
    #[diagnostic(
        code(dispatch::out_of_memory),
        help("The payload copy could not be allocated. Nothing was enqueued.")
    )]
    OutOfMemory,

    #[error("dispatcher is shut down")]
    #[diagnostic(
        code(dispatch::closed),
        help("Teardown has begun; no further work is accepted.")
    )]
    Closed,
}
