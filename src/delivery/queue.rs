//! Bounded delivery queue with overflow policies
//!
//! One queue per sink wrapper. Producers push under the configured overflow
//! policy; the single worker pops FIFO. A channel cannot evict from the
//! producer side (DiscardOldest needs that), so the queue is a deque under a
//! mutex with condvars for not-empty, not-full, and idle transitions.

use crate::core::continuation::{Continuation, DeliveryOutcome};
use crate::core::log_event::LogEvent;
use crate::core::overflow_policy::OverflowPolicy;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// One queued delivery: the shared event plus its completion handle
#[derive(Debug)]
pub struct SinkQueueEntry {
    pub event: Arc<LogEvent>,
    pub enqueue_time: Instant,
    continuation: Option<Continuation>,
}

impl SinkQueueEntry {
    pub fn new(event: Arc<LogEvent>) -> Self {
        let continuation = event.continuation.clone();
        Self {
            event,
            enqueue_time: Instant::now(),
            continuation,
        }
    }

    /// Fulfill the continuation with this entry's terminal outcome
    ///
    /// Consumes the entry; each entry completes exactly once.
    pub fn complete(self, outcome: DeliveryOutcome) {
        if let Some(continuation) = self.continuation {
            continuation.notify(outcome);
        }
    }
}

/// What happened to a push
#[derive(Debug)]
pub enum PushOutcome {
    /// Entry is queued
    Queued,
    /// Entry is queued; the returned oldest entry was evicted to make room
    Displaced(SinkQueueEntry),
    /// The incoming entry was refused (DiscardNew)
    Rejected(SinkQueueEntry),
    /// Block policy timed out waiting for space
    TimedOut(SinkQueueEntry),
    /// The queue no longer accepts entries
    Closed(SinkQueueEntry),
}

struct QueueInner {
    entries: VecDeque<SinkQueueEntry>,
    closed: bool,
    /// Worker is between pop and entry_done for one entry
    in_flight: bool,
}

pub struct BoundedQueue {
    inner: Mutex<QueueInner>,
    not_empty: Condvar,
    not_full: Condvar,
    idle: Condvar,
    capacity: usize,
    policy: OverflowPolicy,
}

impl BoundedQueue {
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        Self {
            inner: Mutex::new(QueueInner {
                entries: VecDeque::with_capacity(capacity.min(1024)),
                closed: false,
                in_flight: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            idle: Condvar::new(),
            capacity: capacity.max(1),
            policy,
        }
    }

    pub fn policy(&self) -> &OverflowPolicy {
        &self.policy
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Push one entry under the configured overflow policy
    pub fn push(&self, entry: SinkQueueEntry) -> PushOutcome {
        let mut inner = self.inner.lock();
        if inner.closed {
            return PushOutcome::Closed(entry);
        }

        if matches!(self.policy, OverflowPolicy::Grow) || inner.entries.len() < self.capacity {
            inner.entries.push_back(entry);
            self.not_empty.notify_one();
            return PushOutcome::Queued;
        }

        match self.policy {
            OverflowPolicy::DiscardNew => PushOutcome::Rejected(entry),
            OverflowPolicy::DiscardOldest => {
                let evicted = inner
                    .entries
                    .pop_front()
                    .expect("queue is full, capacity >= 1");
                inner.entries.push_back(entry);
                self.not_empty.notify_one();
                PushOutcome::Displaced(evicted)
            }
            OverflowPolicy::Block(timeout) => {
                let deadline = Instant::now() + timeout;
                loop {
                    if self.not_full.wait_until(&mut inner, deadline).timed_out() {
                        return if inner.closed {
                            PushOutcome::Closed(entry)
                        } else if inner.entries.len() < self.capacity {
                            inner.entries.push_back(entry);
                            self.not_empty.notify_one();
                            PushOutcome::Queued
                        } else {
                            PushOutcome::TimedOut(entry)
                        };
                    }
                    if inner.closed {
                        return PushOutcome::Closed(entry);
                    }
                    if inner.entries.len() < self.capacity {
                        inner.entries.push_back(entry);
                        self.not_empty.notify_one();
                        return PushOutcome::Queued;
                    }
                }
            }
            OverflowPolicy::Grow => unreachable!("Grow never reaches the full branch"),
        }
    }

    /// Worker side: block until an entry is available or the queue is closed
    /// and drained, then return it. `None` means the worker should exit.
    pub fn pop(&self) -> Option<SinkQueueEntry> {
        let mut inner = self.inner.lock();
        loop {
            if let Some(entry) = inner.entries.pop_front() {
                inner.in_flight = true;
                self.not_full.notify_one();
                return Some(entry);
            }
            if inner.closed {
                return None;
            }
            self.not_empty.wait(&mut inner);
        }
    }

    /// Worker side: the entry returned by the last `pop` reached a terminal
    /// outcome
    pub fn entry_done(&self) {
        let mut inner = self.inner.lock();
        inner.in_flight = false;
        if inner.entries.is_empty() {
            self.idle.notify_all();
        }
    }

    /// Wait until the queue is empty with no entry in flight
    ///
    /// Returns `true` if drained, `false` on timeout.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut inner = self.inner.lock();
        while !inner.entries.is_empty() || inner.in_flight {
            if self.idle.wait_until(&mut inner, deadline).timed_out() {
                return inner.entries.is_empty() && !inner.in_flight;
            }
        }
        true
    }

    /// Stop accepting entries; the worker drains what remains and exits
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        inner.closed = true;
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    /// Remove and return everything still queued (shutdown abandonment)
    pub fn drain_remaining(&self) -> Vec<SinkQueueEntry> {
        let mut inner = self.inner.lock();
        let drained: Vec<SinkQueueEntry> = inner.entries.drain(..).collect();
        if !inner.in_flight {
            self.idle.notify_all();
        }
        drained
    }
}
