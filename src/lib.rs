//! # Log Router System
//!
//! A structured-event routing and delivery pipeline: events carry a logger
//! name, severity, message template, and contextual data; rules decide which
//! sinks receive each event; every sink gets a bounded queue with a
//! background worker, overflow policy, and retry-with-backoff; layouts render
//! events into sink-specific text.
//!
//! ## Features
//!
//! - **Rule Routing**: Ordered logger-pattern/level-range rules with filter
//!   chains and atomic table reload
//! - **Layout Engine**: `${...}` templates compiled once, rendered without
//!   failure
//! - **Reliable Delivery**: Per-sink bounded queues, FIFO workers, overflow
//!   policies, retry with jittered backoff, completion continuations
//! - **Thread Safe**: Designed for concurrent producers

pub mod config;
pub mod core;
pub mod delivery;
pub mod dispatcher;
pub mod filters;
pub mod layout;
pub mod macros;
pub mod routing;
pub mod sinks;

pub mod prelude {
    pub use crate::config::{build_dispatcher, build_table, LoggingConfig, SinkRegistry};
    pub use crate::core::{
        Continuation, DeliveryMetrics, DeliveryOutcome, DispatcherMetrics, EventProperties,
        FieldValue, LogEvent, LogLevel, LoggerError, OverflowPolicy, RenderedEvent, Result, Sink,
    };
    pub use crate::delivery::{
        AsyncSinkConfig, AsyncSinkWrapper, Backoff, FlushResult, Jitter, RetryPolicy,
        DEFAULT_SHUTDOWN_TIMEOUT,
    };
    pub use crate::dispatcher::Dispatcher;
    pub use crate::filters::{FilterAction, FilterChain, FilterRule, FilterVerdict};
    pub use crate::layout::{Layout, RendererRegistry};
    pub use crate::routing::{LoggerNamePattern, Router, RoutingRule, RuleTable};
    pub use crate::sinks::MemorySink;
}

pub use config::{
    build_dispatcher, build_table, FilterConfig, LoggingConfig, QueueParams, RuleConfig,
    SinkConfig, SinkRegistry,
};
pub use crate::core::{
    Continuation, DeliveryMetrics, DeliveryOutcome, DispatcherMetrics, EventProperties, FieldValue,
    LogEvent, LogLevel, LoggerError, OverflowPolicy, RenderedEvent, Result, Sink,
};
pub use delivery::{
    AsyncSinkConfig, AsyncSinkWrapper, Backoff, FlushResult, Jitter, RetryPolicy, SinkQueueEntry,
    DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use dispatcher::Dispatcher;
pub use filters::{FilterAction, FilterChain, FilterCondition, FilterRule, FilterVerdict};
pub use layout::{Layout, RendererNode, RendererRegistry, ResolvedOptions};
pub use routing::{LoggerNamePattern, Router, RoutingRule, RuleTable};
pub use sinks::MemorySink;

#[cfg(feature = "console")]
pub use sinks::ConsoleSink;

#[cfg(feature = "file")]
pub use sinks::FileSink;
