//! Dispatch macros for ergonomic event construction.
//!
//! These macros build a [`LogEvent`](crate::LogEvent) with automatic string
//! formatting and hand it to a dispatcher, similar to `println!` and
//! `format!`.
//!
//! # Examples
//!
//! ```
//! use log_router_system::prelude::*;
//! use log_router_system::info;
//!
//! let dispatcher = Dispatcher::new(RuleTable::default());
//!
//! // Basic logging
//! info!(dispatcher, "app.server", "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(dispatcher, "app.server", "Listening on port {}", port);
//! ```

/// Dispatch an event with automatic formatting.
///
/// # Examples
///
/// ```
/// # use log_router_system::prelude::*;
/// # let dispatcher = Dispatcher::new(RuleTable::default());
/// use log_router_system::log;
/// log!(dispatcher, "app", LogLevel::Info, "Simple message");
/// log!(dispatcher, "app", LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($dispatcher:expr, $logger:expr, $level:expr, $($arg:tt)+) => {
        $dispatcher.dispatch($crate::LogEvent::new($logger, $level, format!($($arg)+)))
    };
}

/// Dispatch a trace-level event.
#[macro_export]
macro_rules! trace {
    ($dispatcher:expr, $logger:expr, $($arg:tt)+) => {
        $crate::log!($dispatcher, $logger, $crate::LogLevel::Trace, $($arg)+)
    };
}

/// Dispatch a debug-level event.
#[macro_export]
macro_rules! debug {
    ($dispatcher:expr, $logger:expr, $($arg:tt)+) => {
        $crate::log!($dispatcher, $logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Dispatch an info-level event.
#[macro_export]
macro_rules! info {
    ($dispatcher:expr, $logger:expr, $($arg:tt)+) => {
        $crate::log!($dispatcher, $logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Dispatch a warning-level event.
#[macro_export]
macro_rules! warn {
    ($dispatcher:expr, $logger:expr, $($arg:tt)+) => {
        $crate::log!($dispatcher, $logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Dispatch an error-level event.
#[macro_export]
macro_rules! error {
    ($dispatcher:expr, $logger:expr, $($arg:tt)+) => {
        $crate::log!($dispatcher, $logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Dispatch a fatal-level event.
#[macro_export]
macro_rules! fatal {
    ($dispatcher:expr, $logger:expr, $($arg:tt)+) => {
        $crate::log!($dispatcher, $logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}
