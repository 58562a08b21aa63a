//! File sink implementation

use crate::core::{LoggerError, RenderedEvent, Result, Sink};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Appends rendered lines to a file through a buffered writer
pub struct FileSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl FileSink {
    /// Create a sink that opens `path` on initialize
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
        }
    }

    /// Create a sink and open the file immediately
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let mut sink = Self::new(path);
        sink.open_writer()?;
        Ok(sink)
    }

    fn open_writer(&mut self) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                LoggerError::init_failed("file", format!("{}: {}", self.path.display(), e))
            })?;
        self.writer = Some(BufWriter::new(file));
        Ok(())
    }
}

impl Sink for FileSink {
    fn initialize(&mut self, params: &HashMap<String, String>) -> Result<()> {
        if let Some(path) = params.get("path") {
            self.path = PathBuf::from(path);
        }
        if self.writer.is_none() {
            self.open_writer()?;
        }
        Ok(())
    }

    fn write(&mut self, event: &RenderedEvent) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| LoggerError::write_failed("file", "writer not initialized"))?;

        writer.write_all(event.display_text().as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.flush()?;
        self.writer = None;
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        // Ensure all buffered data is flushed to disk
        let _ = self.flush();
    }
}
