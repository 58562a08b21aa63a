//! Core pipeline types and traits

pub mod continuation;
pub mod error;
pub mod log_event;
pub mod log_level;
pub mod metrics;
pub mod overflow_policy;
pub mod properties;
pub mod sink;

pub use continuation::{Continuation, DeliveryOutcome};
pub use error::{LoggerError, Result};
pub use log_event::LogEvent;
pub use log_level::LogLevel;
pub use metrics::{DeliveryMetrics, DispatcherMetrics};
pub use overflow_policy::OverflowPolicy;
pub use properties::{EventProperties, FieldValue};
pub use sink::{RenderedEvent, Sink};
