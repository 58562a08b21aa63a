//! Pipeline entry point
//!
//! The dispatcher consults the router for every event and enqueues it to the
//! matched sinks' wrappers. Nothing in this path raises to the caller:
//! enqueue failures are absorbed into metrics, continuations, and a
//! rate-limited stderr diagnostic.

use crate::core::log_event::LogEvent;
use crate::core::metrics::DispatcherMetrics;
use crate::delivery::{FlushResult, DEFAULT_SHUTDOWN_TIMEOUT};
use crate::routing::{Router, RuleTable};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub struct Dispatcher {
    router: Router,
    metrics: DispatcherMetrics,
}

impl Dispatcher {
    pub fn new(table: RuleTable) -> Self {
        Self {
            router: Router::new(table),
            metrics: DispatcherMetrics::new(),
        }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn metrics(&self) -> &DispatcherMetrics {
        &self.metrics
    }

    /// Route one event to every matched sink
    ///
    /// A no-op when no rule matches. Blocks only when a matched wrapper is
    /// configured with the Block overflow policy.
    pub fn dispatch(&self, event: LogEvent) {
        self.metrics.record_dispatched();

        let event = Arc::new(event);
        let sinks = self.router.match_event(&event);
        if sinks.is_empty() {
            self.metrics.record_unrouted();
            return;
        }

        for wrapper in sinks {
            if let Err(e) = wrapper.enqueue(Arc::clone(&event)) {
                let failures = self.metrics.record_enqueue_failure();
                if failures == 0 || (failures + 1).is_multiple_of(1000) {
                    eprintln!(
                        "[LOGROUTER WARNING] enqueue to sink '{}' failed ({} total): {}",
                        wrapper.name(),
                        failures + 1,
                        e
                    );
                }
            }
        }
    }

    /// Atomically install a new routing table
    ///
    /// In-flight dispatches finish against the table they already loaded;
    /// wrappers shared between old and new tables keep running untouched.
    pub fn reload(&self, table: RuleTable) {
        self.router.reload(table);
    }

    /// Drain every wrapper reachable from the active table
    ///
    /// Returns `true` when all queues drained within the shared timeout.
    pub fn flush_all(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut drained = true;
        for wrapper in self.router.snapshot().wrappers() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if wrapper.flush(remaining) == FlushResult::TimedOut {
                drained = false;
            }
        }
        drained
    }

    /// Stop intake on every wrapper, drain or abandon, and join workers
    pub fn shutdown(&self, drain_timeout: Duration) -> bool {
        let deadline = Instant::now() + drain_timeout;
        let mut clean = true;
        for wrapper in self.router.snapshot().wrappers() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if !wrapper.shutdown(remaining) {
                clean = false;
            }
        }
        clean
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("router", &self.router)
            .field("dispatched", &self.metrics.dispatched())
            .finish()
    }
}
