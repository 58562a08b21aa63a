//! Asynchronous delivery wrapper
//!
//! Decouples producers from sinks: every sink gets a bounded queue and a
//! single background worker that drains it FIFO, renders through the optional
//! pre-write layout, writes with retry, and fulfills continuations. One
//! worker per wrapper means sinks never see concurrent writes.

use super::queue::{BoundedQueue, PushOutcome, SinkQueueEntry};
use super::retry::RetryPolicy;
use crate::core::continuation::DeliveryOutcome;
use crate::core::error::{LoggerError, Result};
use crate::core::log_event::LogEvent;
use crate::core::metrics::DeliveryMetrics;
use crate::core::overflow_policy::OverflowPolicy;
use crate::core::sink::{RenderedEvent, Sink};
use crate::layout::Layout;
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Default drain timeout used when a wrapper is dropped without explicit
/// shutdown
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of a flush call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushResult {
    /// Queue drained, including the in-flight entry
    Drained,
    /// Timeout elapsed with entries still pending
    TimedOut,
}

/// Queue and retry configuration for one wrapper
#[derive(Debug, Clone)]
pub struct AsyncSinkConfig {
    pub queue_size: usize,
    pub overflow_policy: OverflowPolicy,
    pub retry: RetryPolicy,
}

impl Default for AsyncSinkConfig {
    fn default() -> Self {
        Self {
            queue_size: 10_000,
            overflow_policy: OverflowPolicy::default(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Bounded queue + background worker wrapped around one sink
pub struct AsyncSinkWrapper {
    name: String,
    queue: Arc<BoundedQueue>,
    metrics: Arc<DeliveryMetrics>,
    worker: Mutex<Option<thread::JoinHandle<()>>>,
}

impl AsyncSinkWrapper {
    /// Start the worker and return the shared wrapper handle
    pub fn spawn(
        name: impl Into<String>,
        sink: Box<dyn Sink>,
        layout: Option<Layout>,
        config: AsyncSinkConfig,
    ) -> Arc<Self> {
        let name = name.into();
        let queue = Arc::new(BoundedQueue::new(
            config.queue_size,
            config.overflow_policy.clone(),
        ));
        let metrics = Arc::new(DeliveryMetrics::new());

        let worker_queue = Arc::clone(&queue);
        let worker_metrics = Arc::clone(&metrics);
        let worker_name = name.clone();
        let retry = config.retry.clone();
        let handle = thread::spawn(move || {
            worker_loop(
                worker_name,
                sink,
                layout,
                worker_queue,
                worker_metrics,
                retry,
            );
        });

        Arc::new(Self {
            name,
            queue,
            metrics,
            worker: Mutex::new(Some(handle)),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metrics(&self) -> &DeliveryMetrics {
        &self.metrics
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Append one event to the queue
    ///
    /// Returns immediately except under `Block` overflow policy. Discarded
    /// and displaced entries have their continuations fulfilled here; only
    /// Block timeouts and a closed queue surface as errors.
    pub fn enqueue(&self, event: Arc<LogEvent>) -> Result<()> {
        let entry = SinkQueueEntry::new(event);
        match self.queue.push(entry) {
            PushOutcome::Queued => {
                self.metrics.record_enqueued();
                Ok(())
            }
            PushOutcome::Displaced(evicted) => {
                self.metrics.record_enqueued();
                self.metrics.record_queue_full();
                self.metrics.record_dropped();
                evicted.complete(DeliveryOutcome::Discarded);
                Ok(())
            }
            PushOutcome::Rejected(entry) => {
                self.metrics.record_queue_full();
                self.metrics.record_dropped();
                entry.complete(DeliveryOutcome::Discarded);
                Ok(())
            }
            PushOutcome::TimedOut(entry) => {
                self.metrics.record_queue_full();
                self.metrics.record_dropped();
                entry.complete(DeliveryOutcome::TimedOut);
                let waited = match self.queue.policy() {
                    OverflowPolicy::Block(timeout) => *timeout,
                    _ => Duration::ZERO,
                };
                Err(LoggerError::queue_timeout(self.name.as_str(), waited))
            }
            PushOutcome::Closed(entry) => {
                entry.complete(DeliveryOutcome::Discarded);
                Err(LoggerError::queue_closed(self.name.as_str()))
            }
        }
    }

    /// Block until the queue drains or the timeout elapses
    pub fn flush(&self, timeout: Duration) -> FlushResult {
        if self.queue.wait_idle(timeout) {
            FlushResult::Drained
        } else {
            FlushResult::TimedOut
        }
    }

    /// Stop intake, drain (or abandon after `drain_timeout`), and join the
    /// worker
    ///
    /// Abandoned entries have their continuations fulfilled with `Discarded`.
    /// Returns `true` when the queue drained fully and the worker exited.
    pub fn shutdown(&self, drain_timeout: Duration) -> bool {
        self.queue.close();

        let drained = self.queue.wait_idle(drain_timeout);
        if !drained {
            for entry in self.queue.drain_remaining() {
                self.metrics.record_dropped();
                entry.complete(DeliveryOutcome::Discarded);
            }
        }

        let joined = self.join_worker(DEFAULT_SHUTDOWN_TIMEOUT);
        drained && joined
    }

    fn join_worker(&self, timeout: Duration) -> bool {
        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            let start = std::time::Instant::now();
            loop {
                if handle.is_finished() {
                    if let Err(e) = handle.join() {
                        eprintln!(
                            "[LOGROUTER ERROR] worker for sink '{}' panicked during shutdown: {:?}",
                            self.name, e
                        );
                        return false;
                    }
                    return true;
                }
                if start.elapsed() >= timeout {
                    eprintln!(
                        "[LOGROUTER WARNING] worker for sink '{}' did not finish within {:?}",
                        self.name, timeout
                    );
                    return false;
                }
                thread::sleep(Duration::from_millis(10));
            }
        } else {
            true
        }
    }
}

impl Drop for AsyncSinkWrapper {
    fn drop(&mut self) {
        // Close the queue first so the worker drains pending entries and
        // exits on its own.
        self.queue.close();
        let _ = self.join_worker(DEFAULT_SHUTDOWN_TIMEOUT);
    }
}

impl std::fmt::Debug for AsyncSinkWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncSinkWrapper")
            .field("name", &self.name)
            .field("queue_len", &self.queue.len())
            .finish()
    }
}

fn worker_loop(
    name: String,
    mut sink: Box<dyn Sink>,
    layout: Option<Layout>,
    queue: Arc<BoundedQueue>,
    metrics: Arc<DeliveryMetrics>,
    retry: RetryPolicy,
) {
    while let Some(entry) = queue.pop() {
        let rendered = match &layout {
            Some(layout) => {
                let text = layout.render(&entry.event);
                RenderedEvent::with_text(Arc::clone(&entry.event), text)
            }
            None => RenderedEvent::raw(Arc::clone(&entry.event)),
        };

        let mut attempt = 0;
        let outcome = loop {
            attempt += 1;
            match sink.write(&rendered) {
                Ok(()) => break DeliveryOutcome::Success,
                Err(e) => {
                    metrics.record_write_failure();
                    if attempt < retry.max_attempts() {
                        metrics.record_retry();
                        thread::sleep(retry.delay_before(attempt));
                    } else {
                        break DeliveryOutcome::Error(e.to_string());
                    }
                }
            }
        };

        match &outcome {
            DeliveryOutcome::Success => {
                metrics.record_delivered();
            }
            DeliveryOutcome::Error(message) => {
                let dropped = metrics.record_dropped();
                if dropped == 0 || (dropped + 1).is_multiple_of(1000) {
                    eprintln!(
                        "[LOGROUTER WARNING] sink '{}' exhausted {} attempts: {} ({} entries dropped)",
                        name,
                        retry.max_attempts(),
                        message,
                        dropped + 1
                    );
                }
            }
            _ => {}
        }

        // flush before signaling idle so a drained flush() means durable output
        if queue.is_empty() {
            if let Err(e) = sink.flush() {
                eprintln!("[LOGROUTER ERROR] sink '{}' flush failed: {}", name, e);
            }
        }

        entry.complete(outcome);
        queue.entry_done();
    }

    if let Err(e) = sink.flush() {
        eprintln!("[LOGROUTER ERROR] sink '{}' flush failed: {}", name, e);
    }
    if let Err(e) = sink.close() {
        eprintln!("[LOGROUTER ERROR] sink '{}' close failed: {}", name, e);
    }
}
