/*!
 * Dispatch Statistics
 * Atomic counters for zero-contention tracking on the submission and
 * drain hot paths
 */

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free dispatch counters
///
/// # Performance
/// - Cache-line aligned to prevent false sharing with the ring cursors
/// - Relaxed ordering throughout; snapshots are advisory
#[repr(C, align(64))]
pub(crate) struct AtomicDispatchStats {
    submitted: AtomicU64,
    executed: AtomicU64,
    aborted: AtomicU64,
    rejected: AtomicU64,
}

impl AtomicDispatchStats {
    pub const fn new() -> Self {
        Self {
            submitted: AtomicU64::new(0),
            executed: AtomicU64::new(0),
            aborted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    #[inline(always)]
    pub fn inc_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_executed(&self) {
        self.executed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_aborted(&self) {
        self.aborted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Read-only snapshot, no synchronization required
    pub fn snapshot(&self, queued: usize, capacity: usize) -> DispatchStats {
        DispatchStats {
            queued,
            capacity,
            submitted: self.submitted.load(Ordering::Relaxed),
            executed: self.executed.load(Ordering::Relaxed),
            aborted: self.aborted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time dispatcher statistics
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DispatchStats {
    /// Slots currently waiting for the dispatch loop
    pub queued: usize,
    /// Total ring slots (usable capacity is one less)
    pub capacity: usize,
    /// Successful enqueues since creation
    pub submitted: u64,
    /// Slots whose target ran to completion
    pub executed: u64,
    /// Slots released by teardown without running
    pub aborted: u64,
    /// Submissions rejected with back-pressure
    pub rejected: u64,
}
