//! Log event structure

use super::continuation::Continuation;
use super::log_level::LogLevel;
use super::properties::{EventProperties, FieldValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

// Thread-local cache for the producer thread id to avoid repeated allocations
thread_local! {
    static THREAD_ID_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Get cached thread ID, computing and caching it on first access
fn get_thread_id() -> String {
    THREAD_ID_CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();
        if cache.is_none() {
            *cache = Some(format!("{:?}", std::thread::current().id()));
        }
        cache
            .as_ref()
            .expect("thread_id cache initialized in previous line")
            .clone()
    })
}

/// One immutable unit of log data
///
/// Constructed at the call site with the builder-style `with_*` methods,
/// then handed to the dispatcher. Once dispatched it is shared read-only
/// (`Arc<LogEvent>`) by every sink that processes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub logger_name: String,
    pub level: LogLevel,
    /// Message template; may contain `{0}`-style positional holes filled
    /// from `args` and `{name}` holes filled from `properties`
    pub message: String,
    pub args: Vec<FieldValue>,
    pub properties: EventProperties,
    pub exception: Option<String>,
    pub thread_id: String,
    #[serde(skip)]
    pub continuation: Option<Continuation>,
}

impl LogEvent {
    /// Sanitize log message to prevent log injection attacks
    ///
    /// Replaces newlines, carriage returns, and tabs with escape sequences
    /// to prevent attackers from injecting fake log entries.
    fn sanitize_message(message: &str) -> String {
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    pub fn new(logger_name: impl Into<String>, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            logger_name: logger_name.into(),
            level,
            message: Self::sanitize_message(&message.into()),
            args: Vec::new(),
            properties: EventProperties::new(),
            exception: None,
            thread_id: get_thread_id(),
            continuation: None,
        }
    }

    pub fn with_args(mut self, args: Vec<FieldValue>) -> Self {
        self.args = args;
        self
    }

    pub fn with_arg(mut self, arg: impl Into<FieldValue>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.properties.insert(key, value);
        self
    }

    pub fn with_exception(mut self, exception: impl Into<String>) -> Self {
        self.exception = Some(exception.into());
        self
    }

    pub fn with_continuation(mut self, continuation: Continuation) -> Self {
        self.continuation = Some(continuation);
        self
    }

    /// Expand the message template against `args` and `properties`
    ///
    /// `{0}`, `{1}`, … take the positional argument at that index; `{name}`
    /// takes the property of that name. Unresolvable holes expand to the
    /// empty string; `{{` and `}}` escape literal braces. A `{` without a
    /// closing brace is emitted as-is.
    pub fn formatted_message(&self) -> String {
        if !self.message.contains('{') {
            return self.message.clone();
        }

        let mut out = String::with_capacity(self.message.len() + 16);
        let mut chars = self.message.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' => {
                    if chars.peek() == Some(&'{') {
                        chars.next();
                        out.push('{');
                        continue;
                    }
                    let mut hole = String::new();
                    let mut closed = false;
                    for h in chars.by_ref() {
                        if h == '}' {
                            closed = true;
                            break;
                        }
                        hole.push(h);
                    }
                    if !closed {
                        out.push('{');
                        out.push_str(&hole);
                        break;
                    }
                    match hole.parse::<usize>() {
                        Ok(index) => {
                            if let Some(value) = self.args.get(index) {
                                out.push_str(&value.to_string());
                            }
                        }
                        Err(_) => {
                            if let Some(value) = self.properties.get(&hole) {
                                out.push_str(&value.to_string());
                            }
                        }
                    }
                }
                '}' => {
                    if chars.peek() == Some(&'}') {
                        chars.next();
                    }
                    out.push('}');
                }
                _ => out.push(c),
            }
        }

        out
    }
}
