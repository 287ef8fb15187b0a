/*!
 * Task Target
 *
 * The opaque callable a producer hands to the dispatcher. Replaces the
 * classic function-pointer-plus-instance-pointer pair with a trait object:
 * implement `TaskTarget` on the component the work runs against, or use a
 * closure that captures it.
 */

/// Return code produced by a task target
///
/// Opaque to the dispatcher: delivered verbatim to a synchronous waiter,
/// discarded for asynchronous submissions. A non-zero code is the target's
/// business, not a dispatcher failure.
pub type TaskCode = i32;

/// A unit of deferred work, executed on the consumer thread
///
/// Targets run strictly one at a time (single consumer), so they need no
/// locking against each other. They may still need locking against
/// producer-side access to state shared outside the dispatcher.
pub trait TaskTarget: Send + Sync {
    /// Run the deferred operation
    ///
    /// `arg` is the integer tag the submitter passed; `payload` is the
    /// dispatcher-owned duplicate of the submitter's buffer, if any.
    fn run(&self, arg: i32, payload: Option<&[u8]>) -> TaskCode;
}

impl<F> TaskTarget for F
where
    F: Fn(i32, Option<&[u8]>) -> TaskCode + Send + Sync,
{
    #[inline]
    fn run(&self, arg: i32, payload: Option<&[u8]>) -> TaskCode {
        (self)(arg, payload)
    }
}
