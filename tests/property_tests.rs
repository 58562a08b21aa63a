//! Property-based tests for the routing pipeline using proptest

use log_router_system::prelude::*;
use log_router_system::sinks::MemorySink;
use proptest::prelude::*;
use std::sync::Arc;

// ============================================================================
// Layout Tests
// ============================================================================

/// Literal fragments that never open a token or an escape
fn literal_fragment() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,_-]{0,12}"
}

/// Tokens built from known renderer names
fn token_fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("${message}".to_string()),
        Just("${level}".to_string()),
        Just("${level:format=lowercase}".to_string()),
        Just("${logger}".to_string()),
        Just("${logger:shortName=true}".to_string()),
        Just("${basedir}".to_string()),
        Just("${longdate}".to_string()),
        Just("${newline}".to_string()),
        Just("${event-properties:name=user}".to_string()),
        Just("${exception}".to_string()),
        Just("${threadid}".to_string()),
        Just("${uppercase:inner=${message}}".to_string()),
    ]
}

/// A well-formed template: literals interleaved with known tokens
fn valid_template() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![literal_fragment(), token_fragment()],
        0..8,
    )
    .prop_map(|parts| parts.concat())
}

/// One router (and its worker threads) shared across all proptest cases
fn shared_router() -> &'static Router {
    static ROUTER: std::sync::OnceLock<Router> = std::sync::OnceLock::new();
    ROUTER.get_or_init(|| {
        let wrapper = |name: &str| {
            AsyncSinkWrapper::spawn(
                name,
                Box::new(MemorySink::new()),
                None,
                AsyncSinkConfig::default(),
            )
        };
        Router::new(RuleTable::new(vec![
            RoutingRule::new("app.*", LogLevel::Debug).with_sink(wrapper("alpha")),
            RoutingRule::new("*", LogLevel::Info).with_sink(wrapper("beta")),
            RoutingRule::new("*.audit", LogLevel::Trace).with_sink(wrapper("gamma")),
        ]))
    })
}

fn arb_level() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::Trace),
        Just(LogLevel::Debug),
        Just(LogLevel::Info),
        Just(LogLevel::Warn),
        Just(LogLevel::Error),
        Just(LogLevel::Fatal),
    ]
}

proptest! {
    /// Every template that compiles renders against any event without
    /// panicking and produces a string
    #[test]
    fn test_compiled_templates_always_render(
        template in valid_template(),
        logger in "[a-z]{1,8}(\\.[a-z]{1,8}){0,3}",
        message in ".{0,40}",
        level in arb_level(),
    ) {
        let registry = Arc::new(RendererRegistry::with_defaults());
        let layout = Layout::compile_with(&template, &registry).unwrap();
        let event = LogEvent::new(logger, level, message);
        let _rendered = layout.render(&event);
        // render twice: pure function, same output
        assert_eq!(layout.render(&event), layout.render(&event));
    }

    /// Arbitrary input either fails compilation cleanly or renders without
    /// panicking; compilation never panics on malformed templates
    #[test]
    fn test_compile_never_panics(template in ".{0,60}") {
        let registry = Arc::new(RendererRegistry::with_defaults());
        if let Ok(layout) = Layout::compile_with(&template, &registry) {
            let event = LogEvent::new("app", LogLevel::Info, "probe");
            let _ = layout.render(&event);
        }
    }

    // ========================================================================
    // Level Tests
    // ========================================================================

    /// LogLevel string conversions roundtrip correctly
    #[test]
    fn test_log_level_str_roundtrip(level in arb_level()) {
        let as_str = level.to_str();
        let parsed: LogLevel = as_str.parse().unwrap();
        assert_eq!(level, parsed);
    }

    /// LogLevel ordering is consistent with the numeric discriminants
    #[test]
    fn test_log_level_ordering(level1 in arb_level(), level2 in arb_level()) {
        let val1 = level1 as u8;
        let val2 = level2 as u8;

        assert_eq!(level1 <= level2, val1 <= val2);
        assert_eq!(level1 < level2, val1 < val2);
    }

    // ========================================================================
    // Router Tests
    // ========================================================================

    /// match is idempotent and order-preserving for a fixed table
    #[test]
    fn test_match_idempotent(
        logger in "[a-z]{1,6}(\\.[a-z]{1,6}){0,3}",
        level in arb_level(),
    ) {
        let router = shared_router();
        let event = LogEvent::new(logger, level, "probe");
        let first: Vec<String> = router
            .match_event(&event)
            .iter()
            .map(|w| w.name().to_string())
            .collect();
        let second: Vec<String> = router
            .match_event(&event)
            .iter()
            .map(|w| w.name().to_string())
            .collect();

        assert_eq!(first, second);

        // order preserved: names appear in rule declaration order
        let declaration_order = ["alpha", "beta", "gamma"];
        let positions: Vec<usize> = first
            .iter()
            .map(|name| declaration_order.iter().position(|d| d == name).unwrap())
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    /// Pattern matching agrees between a pattern and its own rendered form
    #[test]
    fn test_pattern_display_stable(
        segments in prop::collection::vec("[a-z]{1,5}|\\*", 1..4),
    ) {
        let pattern_str = segments.join(".");
        let pattern = LoggerNamePattern::new(pattern_str.as_str());
        assert_eq!(pattern.pattern(), pattern_str);
        let reparsed = LoggerNamePattern::new(pattern.pattern());
        // same pattern, same decisions
        for name in ["app", "app.db", "x.y.z", "audit"] {
            assert_eq!(pattern.matches(name), reparsed.matches(name));
        }
    }
}

// ============================================================================
// Message formatting
// ============================================================================

proptest! {
    /// Hole expansion never panics, whatever the template and args
    #[test]
    fn test_formatted_message_never_panics(
        message in ".{0,60}",
        args in prop::collection::vec("[a-z0-9]{0,8}", 0..4),
    ) {
        let mut event = LogEvent::new("app", LogLevel::Info, message);
        for arg in args {
            event = event.with_arg(arg);
        }
        let _ = event.formatted_message();
    }
}
