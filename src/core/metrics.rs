//! Pipeline metrics for observability
//!
//! Counters for monitoring delivery health: dropped entries, retries,
//! queue-full events, and dispatch totals.

use std::sync::atomic::{AtomicU64, Ordering};

/// Per-wrapper delivery counters
///
/// Each async sink wrapper owns one instance; the worker thread and producers
/// update it with relaxed atomics.
///
/// # Example
///
/// ```
/// use log_router_system::core::DeliveryMetrics;
///
/// let metrics = DeliveryMetrics::new();
/// metrics.record_enqueued();
/// metrics.record_delivered();
/// assert_eq!(metrics.delivered(), 1);
/// ```
#[derive(Debug)]
pub struct DeliveryMetrics {
    /// Entries accepted into the queue
    enqueued: AtomicU64,

    /// Entries written successfully by the sink
    delivered: AtomicU64,

    /// Entries dropped: overflow policy, retry exhaustion, or abandonment
    dropped: AtomicU64,

    /// Retry attempts after a failed write
    retries: AtomicU64,

    /// Individual failed write calls (each attempt counts)
    write_failures: AtomicU64,

    /// Number of times the queue was found full on enqueue
    queue_full_events: AtomicU64,
}

impl DeliveryMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            enqueued: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            retries: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
            queue_full_events: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn retries(&self) -> u64 {
        self.retries.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn queue_full_events(&self) -> u64 {
        self.queue_full_events.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_enqueued(&self) -> u64 {
        self.enqueued.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_delivered(&self) -> u64 {
        self.delivered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.dropped.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_retry(&self) -> u64 {
        self.retries.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_write_failure(&self) -> u64 {
        self.write_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_queue_full(&self) -> u64 {
        self.queue_full_events.fetch_add(1, Ordering::Relaxed)
    }

    /// Drop rate as a percentage (0.0 - 100.0) of all terminal entries
    pub fn drop_rate(&self) -> f64 {
        let dropped = self.dropped() as f64;
        let total = self.delivered() as f64 + dropped;
        if total == 0.0 {
            0.0
        } else {
            (dropped / total) * 100.0
        }
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        self.enqueued.store(0, Ordering::Relaxed);
        self.delivered.store(0, Ordering::Relaxed);
        self.dropped.store(0, Ordering::Relaxed);
        self.retries.store(0, Ordering::Relaxed);
        self.write_failures.store(0, Ordering::Relaxed);
        self.queue_full_events.store(0, Ordering::Relaxed);
    }
}

impl Default for DeliveryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for DeliveryMetrics {
    /// Create a snapshot of the current counter values
    fn clone(&self) -> Self {
        Self {
            enqueued: AtomicU64::new(self.enqueued()),
            delivered: AtomicU64::new(self.delivered()),
            dropped: AtomicU64::new(self.dropped()),
            retries: AtomicU64::new(self.retries()),
            write_failures: AtomicU64::new(self.write_failures()),
            queue_full_events: AtomicU64::new(self.queue_full_events()),
        }
    }
}

/// Dispatcher-level counters
#[derive(Debug, Default)]
pub struct DispatcherMetrics {
    /// Events handed to dispatch
    dispatched: AtomicU64,

    /// Events that matched no sink
    unrouted: AtomicU64,

    /// Enqueue calls that returned an error
    enqueue_failures: AtomicU64,
}

impl DispatcherMetrics {
    pub const fn new() -> Self {
        Self {
            dispatched: AtomicU64::new(0),
            unrouted: AtomicU64::new(0),
            enqueue_failures: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn unrouted(&self) -> u64 {
        self.unrouted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn enqueue_failures(&self) -> u64 {
        self.enqueue_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dispatched(&self) -> u64 {
        self.dispatched.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_unrouted(&self) -> u64 {
        self.unrouted.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_enqueue_failure(&self) -> u64 {
        self.enqueue_failures.fetch_add(1, Ordering::Relaxed)
    }
}
