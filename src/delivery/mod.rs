//! Asynchronous per-sink delivery: bounded queue, worker, retry

pub mod async_sink;
pub mod queue;
pub mod retry;

pub use async_sink::{
    AsyncSinkConfig, AsyncSinkWrapper, FlushResult, DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use queue::{BoundedQueue, PushOutcome, SinkQueueEntry};
pub use retry::{Backoff, Jitter, RetryPolicy};
