//! Integration tests for the routing pipeline
//!
//! These tests verify:
//! - End-to-end configuration, routing, rendering, and delivery
//! - FIFO ordering per wrapper
//! - Overflow policies and their continuation outcomes
//! - Retry exhaustion
//! - Flush/shutdown draining
//! - Atomic rule-table reload under concurrent dispatch

use log_router_system::prelude::*;
use log_router_system::sinks::MemorySink;
use log_router_system::{build_dispatcher, LoggingConfig};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn memory_wrapper(name: &str) -> (Arc<AsyncSinkWrapper>, Arc<Mutex<Vec<String>>>) {
    let sink = MemorySink::new();
    let buffer = sink.buffer();
    let wrapper = AsyncSinkWrapper::spawn(name, Box::new(sink), None, AsyncSinkConfig::default());
    (wrapper, buffer)
}

fn rendered_memory_wrapper(
    name: &str,
    template: &str,
    config: AsyncSinkConfig,
) -> (Arc<AsyncSinkWrapper>, Arc<Mutex<Vec<String>>>) {
    let registry = Arc::new(RendererRegistry::with_defaults());
    let layout = Layout::compile_with(template, &registry).unwrap();
    let sink = MemorySink::new();
    let buffer = sink.buffer();
    let wrapper = AsyncSinkWrapper::spawn(name, Box::new(sink), Some(layout), config);
    (wrapper, buffer)
}

#[test]
fn test_end_to_end_file_delivery() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("pipeline.log");

    let config = LoggingConfig::from_json(&format!(
        r#"{{
            "sinks": [
                {{
                    "name": "main",
                    "kind": "file",
                    "params": {{"path": "{}"}},
                    "layout": "${{level}} ${{logger}}: ${{message}}"
                }}
            ],
            "rules": [
                {{"logger": "app.*", "min_level": "Info", "write_to": ["main"]}}
            ]
        }}"#,
        log_file.display()
    ))
    .unwrap();

    let registry = Arc::new(RendererRegistry::with_defaults());
    let dispatcher = build_dispatcher(&config, &SinkRegistry::with_defaults(), &registry).unwrap();

    dispatcher.dispatch(LogEvent::new("app.db", LogLevel::Info, "connected"));
    dispatcher.dispatch(LogEvent::new("app.db", LogLevel::Warn, "slow query"));
    dispatcher.dispatch(LogEvent::new("app.db", LogLevel::Debug, "below min level"));
    dispatcher.dispatch(LogEvent::new("web", LogLevel::Error, "no matching rule"));

    assert!(dispatcher.flush_all(Duration::from_secs(2)));

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines, vec!["INFO app.db: connected", "WARN app.db: slow query"]);
}

#[test]
fn test_fifo_order_per_wrapper() {
    let (wrapper, buffer) = rendered_memory_wrapper(
        "ordered",
        "${message}",
        AsyncSinkConfig::default(),
    );
    let dispatcher = Dispatcher::new(RuleTable::new(vec![
        RoutingRule::new("*", LogLevel::Trace).with_sink(wrapper),
    ]));

    for i in 0..100 {
        dispatcher.dispatch(LogEvent::new("app", LogLevel::Info, format!("event {:03}", i)));
    }
    assert!(dispatcher.flush_all(Duration::from_secs(2)));

    let lines = buffer.lock();
    assert_eq!(lines.len(), 100);
    for (i, line) in lines.iter().enumerate() {
        assert_eq!(line, &format!("event {:03}", i));
    }
}

#[test]
fn test_continuation_fan_out() {
    let (first, _) = memory_wrapper("first");
    let (second, _) = memory_wrapper("second");
    let dispatcher = Dispatcher::new(RuleTable::new(vec![
        RoutingRule::new("*", LogLevel::Trace).with_sink(first),
        RoutingRule::new("*", LogLevel::Trace).with_sink(second),
    ]));

    let (continuation, outcomes) = Continuation::channel();
    dispatcher.dispatch(
        LogEvent::new("app", LogLevel::Info, "fan out").with_continuation(continuation),
    );

    // one outcome per accepting sink
    assert_eq!(
        outcomes.recv_timeout(Duration::from_secs(2)).unwrap(),
        DeliveryOutcome::Success
    );
    assert_eq!(
        outcomes.recv_timeout(Duration::from_secs(2)).unwrap(),
        DeliveryOutcome::Success
    );
    assert!(outcomes
        .recv_timeout(Duration::from_millis(100))
        .is_err());
}

#[test]
fn test_retry_exhaustion_calls_and_outcome() {
    struct AlwaysFailingSink {
        calls: Arc<AtomicUsize>,
    }

    impl Sink for AlwaysFailingSink {
        fn write(&mut self, _event: &RenderedEvent) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(LoggerError::write_failed("broken", "unreachable endpoint"))
        }
        fn name(&self) -> &str {
            "broken"
        }
    }

    let calls = Arc::new(AtomicUsize::new(0));
    let wrapper = AsyncSinkWrapper::spawn(
        "broken",
        Box::new(AlwaysFailingSink {
            calls: Arc::clone(&calls),
        }),
        None,
        AsyncSinkConfig {
            retry: RetryPolicy::new(3, Backoff::Constant(Duration::from_millis(1)), Jitter::None),
            ..AsyncSinkConfig::default()
        },
    );
    let dispatcher = Dispatcher::new(RuleTable::new(vec![
        RoutingRule::new("*", LogLevel::Trace).with_sink(wrapper),
    ]));

    let (continuation, outcomes) = Continuation::channel();
    dispatcher.dispatch(
        LogEvent::new("app", LogLevel::Error, "doomed").with_continuation(continuation),
    );

    match outcomes.recv_timeout(Duration::from_secs(2)).unwrap() {
        DeliveryOutcome::Error(message) => assert!(message.contains("unreachable endpoint")),
        other => panic!("expected Error outcome, got {:?}", other),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_block_policy_zero_timeout() {
    struct SlowSink;
    impl Sink for SlowSink {
        fn write(&mut self, _event: &RenderedEvent) -> Result<()> {
            std::thread::sleep(Duration::from_millis(400));
            Ok(())
        }
        fn name(&self) -> &str {
            "slow"
        }
    }

    let wrapper = AsyncSinkWrapper::spawn(
        "slow",
        Box::new(SlowSink),
        None,
        AsyncSinkConfig {
            queue_size: 1,
            overflow_policy: OverflowPolicy::Block(Duration::ZERO),
            ..AsyncSinkConfig::default()
        },
    );

    // occupy the worker, then fill the single queue slot
    wrapper
        .enqueue(Arc::new(LogEvent::new("app", LogLevel::Info, "working")))
        .unwrap();
    std::thread::sleep(Duration::from_millis(100));
    wrapper
        .enqueue(Arc::new(LogEvent::new("app", LogLevel::Info, "queued")))
        .unwrap();

    let result = wrapper.enqueue(Arc::new(LogEvent::new("app", LogLevel::Info, "rejected")));
    assert!(matches!(result, Err(LoggerError::QueueTimeout { .. })));
}

#[test]
fn test_discard_oldest_keeps_newest() {
    struct GateSink {
        gate: Arc<Mutex<bool>>,
        lines: Arc<Mutex<Vec<String>>>,
    }
    impl Sink for GateSink {
        fn write(&mut self, event: &RenderedEvent) -> Result<()> {
            while !*self.gate.lock() {
                std::thread::sleep(Duration::from_millis(5));
            }
            self.lines.lock().push(event.event.message.clone());
            Ok(())
        }
        fn name(&self) -> &str {
            "gate"
        }
    }

    let gate = Arc::new(Mutex::new(false));
    let lines = Arc::new(Mutex::new(Vec::new()));
    let wrapper = AsyncSinkWrapper::spawn(
        "gate",
        Box::new(GateSink {
            gate: Arc::clone(&gate),
            lines: Arc::clone(&lines),
        }),
        None,
        AsyncSinkConfig {
            queue_size: 2,
            overflow_policy: OverflowPolicy::DiscardOldest,
            ..AsyncSinkConfig::default()
        },
    );

    // worker blocks on the first entry; the queue holds the next two; the
    // fourth evicts the oldest queued entry
    wrapper
        .enqueue(Arc::new(LogEvent::new("app", LogLevel::Info, "msg 0")))
        .unwrap();
    std::thread::sleep(Duration::from_millis(50));
    for i in 1..4 {
        wrapper
            .enqueue(Arc::new(LogEvent::new(
                "app",
                LogLevel::Info,
                format!("msg {}", i),
            )))
            .unwrap();
    }
    *gate.lock() = true;

    assert_eq!(wrapper.flush(Duration::from_secs(2)), FlushResult::Drained);

    let lines = lines.lock();
    // msg 0 was in flight; of msg 1..3 the oldest queued (msg 1) was evicted
    assert!(lines.contains(&"msg 0".to_string()));
    assert!(lines.contains(&"msg 3".to_string()));
    assert!(!lines.contains(&"msg 1".to_string()));
}

#[test]
fn test_shutdown_refuses_new_entries() {
    let (wrapper, buffer) = memory_wrapper("closing");
    let dispatcher = Dispatcher::new(RuleTable::new(vec![
        RoutingRule::new("*", LogLevel::Trace).with_sink(Arc::clone(&wrapper)),
    ]));

    dispatcher.dispatch(LogEvent::new("app", LogLevel::Info, "before shutdown"));
    assert!(dispatcher.shutdown(Duration::from_secs(2)));
    assert_eq!(buffer.lock().len(), 1);

    // post-shutdown dispatch is absorbed, not raised
    dispatcher.dispatch(LogEvent::new("app", LogLevel::Info, "after shutdown"));
    assert_eq!(buffer.lock().len(), 1);
    assert_eq!(dispatcher.metrics().enqueue_failures(), 1);
}

#[test]
fn test_reload_race_routes_against_whole_tables() {
    // Both tables route everything to exactly one sink; if a dispatch ever
    // observed a half-built table it would route to zero or two sinks, and
    // the delivered totals would not add up.
    let (old_wrapper, old_buffer) = memory_wrapper("old");
    let (new_wrapper, new_buffer) = memory_wrapper("new");

    let dispatcher = Arc::new(Dispatcher::new(RuleTable::new(vec![
        RoutingRule::new("*", LogLevel::Trace)
            .with_sink(Arc::clone(&old_wrapper))
            .with_final(true),
    ])));

    const PRODUCERS: usize = 4;
    const PER_PRODUCER: usize = 250;

    let mut handles = Vec::new();
    for p in 0..PRODUCERS {
        let dispatcher = Arc::clone(&dispatcher);
        handles.push(std::thread::spawn(move || {
            for i in 0..PER_PRODUCER {
                dispatcher.dispatch(LogEvent::new(
                    format!("producer.{}", p),
                    LogLevel::Info,
                    format!("event {}", i),
                ));
            }
        }));
    }

    // reload mid-stream
    let reloader = {
        let dispatcher = Arc::clone(&dispatcher);
        let new_wrapper = Arc::clone(&new_wrapper);
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(2));
            dispatcher.reload(RuleTable::new(vec![
                RoutingRule::new("*", LogLevel::Trace)
                    .with_sink(new_wrapper)
                    .with_final(true),
            ]));
        })
    };

    for handle in handles {
        handle.join().unwrap();
    }
    reloader.join().unwrap();

    assert!(dispatcher.flush_all(Duration::from_secs(5)));
    old_wrapper.flush(Duration::from_secs(5));

    let old_count = old_buffer.lock().len();
    let new_count = new_buffer.lock().len();
    assert_eq!(
        old_count + new_count,
        PRODUCERS * PER_PRODUCER,
        "every event must route against exactly one fully-formed table \
         (old: {}, new: {})",
        old_count,
        new_count
    );
    assert_eq!(dispatcher.metrics().unrouted(), 0);
}

#[test]
fn test_structured_sink_receives_raw_event() {
    struct StructuredSink {
        payloads: Arc<Mutex<Vec<(String, Option<String>)>>>,
    }
    impl Sink for StructuredSink {
        fn write(&mut self, event: &RenderedEvent) -> Result<()> {
            self.payloads
                .lock()
                .push((event.event.logger_name.clone(), event.text.clone()));
            Ok(())
        }
        fn name(&self) -> &str {
            "structured"
        }
    }

    let payloads = Arc::new(Mutex::new(Vec::new()));
    let wrapper = AsyncSinkWrapper::spawn(
        "structured",
        Box::new(StructuredSink {
            payloads: Arc::clone(&payloads),
        }),
        None,
        AsyncSinkConfig::default(),
    );
    let dispatcher = Dispatcher::new(RuleTable::new(vec![
        RoutingRule::new("*", LogLevel::Trace).with_sink(wrapper),
    ]));

    dispatcher.dispatch(
        LogEvent::new("app.metrics", LogLevel::Info, "raw")
            .with_property("requests", 1205),
    );
    assert!(dispatcher.flush_all(Duration::from_secs(2)));

    let payloads = payloads.lock();
    assert_eq!(payloads[0].0, "app.metrics");
    // no layout configured, so no rendered text
    assert!(payloads[0].1.is_none());
}

#[test]
fn test_sink_initialize_params_applied() {
    struct ParamSink {
        seen: Arc<Mutex<HashMap<String, String>>>,
    }
    impl Sink for ParamSink {
        fn initialize(&mut self, params: &HashMap<String, String>) -> Result<()> {
            *self.seen.lock() = params.clone();
            Ok(())
        }
        fn write(&mut self, _event: &RenderedEvent) -> Result<()> {
            Ok(())
        }
        fn name(&self) -> &str {
            "param"
        }
    }

    let seen = Arc::new(Mutex::new(HashMap::new()));
    let mut registry = SinkRegistry::new();
    {
        let seen = Arc::clone(&seen);
        registry.register("param", move |_config| {
            Ok(Box::new(ParamSink {
                seen: Arc::clone(&seen),
            }))
        });
    }

    let config = LoggingConfig::from_json(
        r#"{
            "sinks": [{"name": "p", "kind": "param", "params": {"endpoint": "tcp://127.0.0.1:9200"}}],
            "rules": [{"logger": "*", "write_to": ["p"]}]
        }"#,
    )
    .unwrap();

    let renderers = Arc::new(RendererRegistry::with_defaults());
    let _dispatcher = build_dispatcher(&config, &registry, &renderers).unwrap();

    assert_eq!(
        seen.lock().get("endpoint").map(String::as_str),
        Some("tcp://127.0.0.1:9200")
    );
}
