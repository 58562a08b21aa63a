//! Console sink implementation

use crate::core::{LogLevel, RenderedEvent, Result, Sink};
use colored::Colorize;
use std::collections::HashMap;
use std::io::Write;

/// Writes rendered lines to stdout, routing Error and Fatal to stderr
pub struct ConsoleSink {
    use_colors: bool,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self { use_colors: true }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ConsoleSink {
    fn initialize(&mut self, params: &HashMap<String, String>) -> Result<()> {
        if let Some(colors) = params.get("colors") {
            self.use_colors = colors != "false";
        }
        Ok(())
    }

    fn write(&mut self, event: &RenderedEvent) -> Result<()> {
        let line = event.display_text();
        let output = if self.use_colors {
            line.as_ref()
                .color(event.event.level.color_code())
                .to_string()
        } else {
            line.into_owned()
        };

        // Error and Fatal go to stderr, everything else to stdout
        match event.event.level {
            LogLevel::Error | LogLevel::Fatal => eprintln!("{}", output),
            _ => println!("{}", output),
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        // Flush both streams since we write to both
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
