//! Bundled sink implementations
//!
//! The core only depends on the [`Sink`](crate::core::Sink) contract; these
//! are the implementations shipped with the crate. External sinks (message
//! queues, network senders) implement the same trait and register their
//! constructors with the [`SinkRegistry`](crate::config::SinkRegistry).

#[cfg(feature = "console")]
pub mod console;

#[cfg(feature = "file")]
pub mod file;

pub mod memory;

#[cfg(feature = "console")]
pub use console::ConsoleSink;

#[cfg(feature = "file")]
pub use file::FileSink;

pub use memory::MemorySink;
