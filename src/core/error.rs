//! Error types for the routing pipeline

use std::time::Duration;

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Template has unbalanced delimiters or malformed tokens
    #[error("template syntax error at position {position} in '{template}': {message}")]
    TemplateSyntax {
        template: String,
        position: usize,
        message: String,
    },

    /// Template nests a renderer inside its own option chain
    #[error("recursive template: renderer '{renderer}' re-enters itself in '{template}'")]
    RecursiveTemplate { renderer: String, template: String },

    /// Template references a renderer name not present in the registry
    #[error("unknown renderer '{name}'")]
    UnknownRenderer { name: String },

    /// Enqueue under Block policy did not find space within the timeout
    #[error("queue for sink '{sink}' still full after {waited:?}")]
    QueueTimeout { sink: String, waited: Duration },

    /// Enqueue after the wrapper stopped accepting entries
    #[error("queue for sink '{sink}' is closed")]
    QueueClosed { sink: String },

    /// Sink write failure, surfaced after the retry budget is exhausted
    #[error("sink '{sink}' write failed: {message}")]
    WriteFailed { sink: String, message: String },

    /// Sink initialization failure at configuration load
    #[error("sink '{sink}' failed to initialize: {message}")]
    InitFailed { sink: String, message: String },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create a template syntax error
    pub fn template_syntax(
        template: impl Into<String>,
        position: usize,
        message: impl Into<String>,
    ) -> Self {
        LoggerError::TemplateSyntax {
            template: template.into(),
            position,
            message: message.into(),
        }
    }

    /// Create a recursive template error
    pub fn recursive_template(renderer: impl Into<String>, template: impl Into<String>) -> Self {
        LoggerError::RecursiveTemplate {
            renderer: renderer.into(),
            template: template.into(),
        }
    }

    /// Create an unknown renderer error
    pub fn unknown_renderer(name: impl Into<String>) -> Self {
        LoggerError::UnknownRenderer { name: name.into() }
    }

    /// Create a queue timeout error
    pub fn queue_timeout(sink: impl Into<String>, waited: Duration) -> Self {
        LoggerError::QueueTimeout {
            sink: sink.into(),
            waited,
        }
    }

    /// Create a queue closed error
    pub fn queue_closed(sink: impl Into<String>) -> Self {
        LoggerError::QueueClosed { sink: sink.into() }
    }

    /// Create a write failure error
    pub fn write_failed(sink: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::WriteFailed {
            sink: sink.into(),
            message: message.into(),
        }
    }

    /// Create an initialization failure error
    pub fn init_failed(sink: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InitFailed {
            sink: sink.into(),
            message: message.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}
