//! In-memory capture sink
//!
//! Stores every line it receives in a shared buffer. Used by tests and demos
//! to observe exactly what a sink was asked to write, in order.

use crate::core::{RenderedEvent, Result, Sink};
use parking_lot::Mutex;
use std::sync::Arc;

pub struct MemorySink {
    buffer: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self {
            buffer: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared handle to the captured lines
    ///
    /// Clones of the handle observe writes made after the clone; the wrapper
    /// keeps the sink itself, so this is how callers read captures back.
    pub fn buffer(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.buffer)
    }

    /// Snapshot of the captured lines
    pub fn lines(&self) -> Vec<String> {
        self.buffer.lock().clone()
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for MemorySink {
    fn write(&mut self, event: &RenderedEvent) -> Result<()> {
        self.buffer.lock().push(event.display_text().into_owned());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
