/*!
 * Dispatch Limits and Constants
 *
 * Centralized limits for the dispatch subsystem.
 * Values include rationale comments explaining WHY they exist.
 */

/// Default number of slots in the work queue
/// Deep enough to absorb submission bursts from non-blocking producer
/// contexts before back-pressure kicks in
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Smallest permitted queue capacity
/// One slot is always sacrificed to tell full from empty, so two slots
/// (one usable) is the floor
pub const MIN_QUEUE_CAPACITY: usize = 2;

/// Result delivered to a synchronous waiter released by teardown
/// The slot's pre-execution default; a target never gets the chance to
/// overwrite it, so waiters can distinguish "queued but never run"
pub const RESULT_ABORTED: i32 = -1;
