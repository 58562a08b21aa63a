//! Sink trait for event output destinations

use super::error::Result;
use super::log_event::LogEvent;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

/// An event as handed to a sink: the shared raw event plus the rendered text
/// produced by the wrapper's pre-write layout, if one is configured.
///
/// Structured sinks ignore `text` and consume the event directly; text sinks
/// use [`display_text`](RenderedEvent::display_text), which falls back to a
/// standard line format when no layout was configured.
#[derive(Debug, Clone)]
pub struct RenderedEvent {
    pub event: Arc<LogEvent>,
    pub text: Option<String>,
}

impl RenderedEvent {
    /// An event with no pre-rendered text
    pub fn raw(event: Arc<LogEvent>) -> Self {
        Self { event, text: None }
    }

    /// An event with layout-rendered text
    pub fn with_text(event: Arc<LogEvent>, text: String) -> Self {
        Self {
            event,
            text: Some(text),
        }
    }

    /// Rendered text, or a standard fallback line when no layout ran
    pub fn display_text(&self) -> Cow<'_, str> {
        match &self.text {
            Some(text) => Cow::Borrowed(text),
            None => {
                let event = &self.event;
                let mut line = format!(
                    "[{}] [{:5}] {} - {}",
                    event.timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
                    event.level.to_str(),
                    event.logger_name,
                    event.formatted_message()
                );
                if !event.properties.is_empty() {
                    line.push(' ');
                    line.push_str(&event.properties.format_fields());
                }
                Cow::Owned(line)
            }
        }
    }
}

/// An output destination for rendered or raw events
///
/// Sinks are driven by exactly one wrapper worker thread at a time, so
/// implementations need no internal synchronization; `Send` is required to
/// move the sink into its worker.
pub trait Sink: Send {
    /// Prepare the sink with its configured parameters
    ///
    /// Called once at configuration load, before any write. A failure marks
    /// the sink unavailable; routing rules referencing it drop it from their
    /// contribution.
    fn initialize(&mut self, params: &HashMap<String, String>) -> Result<()> {
        let _ = params;
        Ok(())
    }

    /// Write one event
    fn write(&mut self, event: &RenderedEvent) -> Result<()>;

    /// Flush buffered output
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// Release resources; called once when the wrapper shuts down
    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str;
}
