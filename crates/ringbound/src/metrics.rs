use crossbeam_utils::CachePadded;
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of the buffer's counters.
///
/// Like [`BoundedRingBuffer::len`](crate::BoundedRingBuffer::len), a snapshot
/// is advisory under concurrent access.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub items_put: u64,
    pub items_taken: u64,
    /// Times a putter found the buffer full and had to wait.
    pub put_waits: u64,
    /// Times a taker found the buffer empty and had to wait.
    pub take_waits: u64,
    /// Deadline-bounded calls that expired.
    pub timeouts: u64,
    /// Puts refused because the buffer was closed.
    pub rejected_closed: u64,
}

/// Thread-safe counters, updated with relaxed atomics.
///
/// Producer-side and consumer-side counters sit on separate cache lines.
#[derive(Debug, Default)]
pub struct Metrics {
    items_put: CachePadded<AtomicU64>,
    put_waits: CachePadded<AtomicU64>,
    items_taken: CachePadded<AtomicU64>,
    take_waits: CachePadded<AtomicU64>,
    timeouts: AtomicU64,
    rejected_closed: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn add_put(&self) {
        self.items_put.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_taken(&self) {
        self.items_taken.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_put_wait(&self) {
        self.put_waits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_take_wait(&self) {
        self.take_waits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_rejected_closed(&self) {
        self.rejected_closed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            items_put: self.items_put.load(Ordering::Relaxed),
            items_taken: self.items_taken.load(Ordering::Relaxed),
            put_waits: self.put_waits.load(Ordering::Relaxed),
            take_waits: self.take_waits.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            rejected_closed: self.rejected_closed.load(Ordering::Relaxed),
        }
    }
}
