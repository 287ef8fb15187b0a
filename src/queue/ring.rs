/*!
 * Task Ring
 *
 * Fixed-capacity circular buffer of task slots: many concurrent producers,
 * exactly one consumer. Producers serialize on a short parking_lot critical
 * section (spins before parking, no syscall on the uncontended path, safe
 * from latency-sensitive producer contexts); the cursor pair is atomic so
 * the consumer's "is there work" probe stays lock-free.
 *
 * # Invariants
 *
 * - `empty ⇔ rpos == wpos`; `full ⇔ (wpos + 1) % capacity == rpos`
 * - at most `capacity - 1` slots are usable at once
 * - only the single consumer advances `rpos`; only a producer holding the
 *   slot lock advances `wpos`
 *
 * Cursor publication uses release stores paired with acquire loads, so once
 * the consumer observes an advanced `wpos` the slot written at that index
 * is visible too. Taking a slot removes it from the array outright, so a
 * wrapped-around cursor can never observe stale fields.
 */

use crate::core::errors::{SubmitError, SubmitResult};
use crate::core::limits::MIN_QUEUE_CAPACITY;
use crate::task::slot::TaskSlot;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Bounded MPSC ring of task slots
pub(crate) struct TaskRing {
    /// Slot storage; entries are `None` except between enqueue and take
    slots: Mutex<Box<[Option<TaskSlot>]>>,
    /// First slot to process (consumer-owned)
    rpos: AtomicUsize,
    /// First free slot (producer-owned, under the slot lock)
    wpos: AtomicUsize,
    /// Set at teardown; rejects all further enqueues
    closed: AtomicBool,
    capacity: usize,
}

impl TaskRing {
    /// Create an empty ring with `capacity` total slots
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity >= MIN_QUEUE_CAPACITY);
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots: Mutex::new(slots.into_boxed_slice()),
            rpos: AtomicUsize::new(0),
            wpos: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
            capacity,
        }
    }

    /// Append a slot at the write cursor
    ///
    /// Short critical section, never sleeps while holding state halfway:
    /// either the slot lands and the cursor advances, or nothing mutates.
    pub fn try_enqueue(&self, slot: TaskSlot) -> SubmitResult<()> {
        let mut slots = self.slots.lock();

        // Read under the lock so enqueue-vs-close is race-free: a producer
        // that saw the ring open completes before teardown's drain takes
        // this same lock.
        if self.closed.load(Ordering::Relaxed) {
            return Err(SubmitError::Closed);
        }

        let pos = self.wpos.load(Ordering::Relaxed);
        let next = (pos + 1) % self.capacity;
        if next == self.rpos.load(Ordering::Acquire) {
            return Err(SubmitError::QueueFull);
        }

        slots[pos] = Some(slot);
        // Publish: slot contents before cursor
        self.wpos.store(next, Ordering::Release);
        Ok(())
    }

    /// Lock-free check usable by the consumer between items
    #[inline]
    pub fn has_work(&self) -> bool {
        self.rpos.load(Ordering::Acquire) != self.wpos.load(Ordering::Acquire)
    }

    /// Remove and return the slot at the read cursor
    ///
    /// Consumer-only; never called concurrently with itself. `None` means
    /// the ring is empty, which is the normal end of a drain rather than an
    /// error.
    pub fn take_next(&self) -> Option<TaskSlot> {
        let mut slots = self.slots.lock();

        let pos = self.rpos.load(Ordering::Relaxed);
        if pos == self.wpos.load(Ordering::Acquire) {
            return None;
        }

        let slot = slots[pos].take();
        self.rpos.store((pos + 1) % self.capacity, Ordering::Release);
        slot
    }

    /// Reject all future enqueues
    ///
    /// Taking the slot lock here fences out in-flight producers: after
    /// `close` returns, every slot that made it in is visible to the
    /// teardown drain.
    pub fn close(&self) {
        let _slots = self.slots.lock();
        self.closed.store(true, Ordering::Release);
    }

    /// Queued slot count (approximate under concurrent access)
    pub fn len(&self) -> usize {
        let rpos = self.rpos.load(Ordering::Acquire);
        let wpos = self.wpos.load(Ordering::Acquire);
        (wpos + self.capacity - rpos) % self.capacity
    }

    /// Total ring slots (usable capacity is one less)
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
