//! Completion notification for dispatched events
//!
//! Every event may carry a continuation. Each sink that accepts the event
//! fulfills the continuation exactly once with the terminal outcome for that
//! sink, which gives callers a hook for flush/shutdown synchronization and for
//! surfacing delivery failures upstream.

use crossbeam_channel::{unbounded, Receiver};
use std::fmt;
use std::sync::Arc;

/// Terminal outcome of one delivery attempt chain for one sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The sink accepted the write
    Success,
    /// The entry was dropped by an overflow policy or abandoned at shutdown
    Discarded,
    /// Enqueue under Block policy timed out
    TimedOut,
    /// The write failed after the retry budget was exhausted
    Error(String),
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryOutcome::Success => write!(f, "Success"),
            DeliveryOutcome::Discarded => write!(f, "Discarded"),
            DeliveryOutcome::TimedOut => write!(f, "TimedOut"),
            DeliveryOutcome::Error(msg) => write!(f, "Error({})", msg),
        }
    }
}

/// Callback invoked once per sink with that sink's terminal outcome
///
/// Cloning is cheap; clones share the same underlying callback. The pipeline
/// clones the continuation into every queue entry it creates, and each entry
/// fulfills its clone exactly once.
#[derive(Clone)]
pub struct Continuation {
    notify: Arc<dyn Fn(DeliveryOutcome) + Send + Sync>,
}

impl Continuation {
    /// Wrap a callback function
    pub fn new(f: impl Fn(DeliveryOutcome) + Send + Sync + 'static) -> Self {
        Self {
            notify: Arc::new(f),
        }
    }

    /// Create a continuation paired with a channel receiver
    ///
    /// Each fulfillment sends one `DeliveryOutcome` on the channel; an event
    /// routed to three sinks produces three messages.
    ///
    /// # Example
    ///
    /// ```
    /// use log_router_system::core::{Continuation, DeliveryOutcome};
    ///
    /// let (continuation, outcomes) = Continuation::channel();
    /// continuation.notify(DeliveryOutcome::Success);
    /// assert_eq!(outcomes.recv().unwrap(), DeliveryOutcome::Success);
    /// ```
    pub fn channel() -> (Self, Receiver<DeliveryOutcome>) {
        let (tx, rx) = unbounded();
        let continuation = Self::new(move |outcome| {
            let _ = tx.send(outcome);
        });
        (continuation, rx)
    }

    /// Fulfill with the given outcome
    pub fn notify(&self, outcome: DeliveryOutcome) {
        (self.notify)(outcome);
    }
}

impl fmt::Debug for Continuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Continuation")
            .field("notify", &"<callback>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_continuation_callback() {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);

        let continuation = Continuation::new(move |_| {
            count_clone.fetch_add(1, Ordering::Relaxed);
        });

        continuation.notify(DeliveryOutcome::Success);
        continuation.notify(DeliveryOutcome::Discarded);
        assert_eq!(count.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_continuation_channel() {
        let (continuation, rx) = Continuation::channel();

        continuation.notify(DeliveryOutcome::Success);
        continuation.notify(DeliveryOutcome::Error("boom".to_string()));

        assert_eq!(rx.recv().unwrap(), DeliveryOutcome::Success);
        assert_eq!(
            rx.recv().unwrap(),
            DeliveryOutcome::Error("boom".to_string())
        );
    }

    #[test]
    fn test_continuation_clone_shares_callback() {
        let (continuation, rx) = Continuation::channel();
        let clone = continuation.clone();

        clone.notify(DeliveryOutcome::TimedOut);
        assert_eq!(rx.recv().unwrap(), DeliveryOutcome::TimedOut);
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(DeliveryOutcome::Success.to_string(), "Success");
        assert_eq!(
            DeliveryOutcome::Error("x".to_string()).to_string(),
            "Error(x)"
        );
    }
}
