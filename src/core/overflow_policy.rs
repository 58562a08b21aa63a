//! Overflow policies for sink delivery queues
//!
//! When a wrapper's bounded queue is full, the policy determines what happens
//! to new entries so that log loss is explicit and observable.

use crate::core::error::LoggerError;
use std::fmt;
use std::time::Duration;

/// Policy for handling queue overflow in a sink's delivery wrapper
///
/// # Example
///
/// ```
/// use log_router_system::OverflowPolicy;
/// use std::time::Duration;
///
/// // Default behavior: drop the incoming entry
/// let policy = OverflowPolicy::default();
///
/// // Block the producer for up to 100ms
/// let policy = OverflowPolicy::Block(Duration::from_millis(100));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Suspend the producer until space frees up or the timeout elapses
    ///
    /// On timeout the enqueue fails with `QueueTimeout` and the entry's
    /// continuation fires with `TimedOut`. A zero timeout fails immediately
    /// when the queue is full.
    Block(Duration),

    /// Evict the oldest queued entry to make room
    ///
    /// The evicted entry's continuation fires with `Discarded`.
    DiscardOldest,

    /// Drop the incoming entry
    ///
    /// The incoming entry's continuation fires with `Discarded`. This is the
    /// default: producers never stall and the oldest context is preserved.
    DiscardNew,

    /// Unbounded queue; use only when memory pressure is acceptable
    Grow,
}

impl Default for OverflowPolicy {
    fn default() -> Self {
        OverflowPolicy::DiscardNew
    }
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverflowPolicy::Block(timeout) => write!(f, "Block({:?})", timeout),
            OverflowPolicy::DiscardOldest => write!(f, "DiscardOldest"),
            OverflowPolicy::DiscardNew => write!(f, "DiscardNew"),
            OverflowPolicy::Grow => write!(f, "Grow"),
        }
    }
}

impl OverflowPolicy {
    /// Parse a policy from its configuration name
    ///
    /// `block_timeout` applies only to `"block"`.
    pub fn from_name(name: &str, block_timeout: Duration) -> Result<Self, LoggerError> {
        match name {
            "block" => Ok(OverflowPolicy::Block(block_timeout)),
            "discard-oldest" => Ok(OverflowPolicy::DiscardOldest),
            "discard-new" => Ok(OverflowPolicy::DiscardNew),
            "grow" => Ok(OverflowPolicy::Grow),
            other => Err(LoggerError::config(
                "overflow_policy",
                format!("unknown policy '{}'", other),
            )),
        }
    }
}
