/*!
 * Dispatch Configuration
 *
 * Runtime configuration for the dispatcher. Queue capacity is the only
 * tunable; everything else is fixed by design (single consumer, strict
 * FIFO, no growth).
 */

use super::limits::{DEFAULT_QUEUE_CAPACITY, MIN_QUEUE_CAPACITY};

/// Dispatcher configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Total ring slots; one is sacrificed to disambiguate full from empty,
    /// so `capacity - 1` submissions can be outstanding at once
    pub capacity: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl DispatchConfig {
    /// Configuration with an explicit queue capacity
    pub const fn with_capacity(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Capacity clamped to the usable minimum
    pub(crate) fn effective_capacity(&self) -> usize {
        self.capacity.max(MIN_QUEUE_CAPACITY)
    }
}
