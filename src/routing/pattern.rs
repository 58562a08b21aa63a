//! Logger-name glob patterns
//!
//! Pattern and name are both split on `.`. A literal segment matches itself
//! exactly; a `*` segment matches one or more consecutive name segments; the
//! whole name must be consumed. Consequences worth remembering:
//!
//! - `"*"` matches every logger name
//! - `"app.*"` matches `app.db` and `app.db.pool`, but not `app`
//! - `"app.*.pool"` matches `app.db.pool` and `app.db.replica.pool`
//! - `*` must stand alone as a segment; `"app*"` is the literal segment
//!   `app*`

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum PatternSegment {
    Literal(String),
    Wildcard,
}

/// A compiled logger-name glob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerNamePattern {
    pattern: String,
    segments: Vec<PatternSegment>,
}

impl LoggerNamePattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let segments = pattern
            .split('.')
            .map(|segment| {
                if segment == "*" {
                    PatternSegment::Wildcard
                } else {
                    PatternSegment::Literal(segment.to_string())
                }
            })
            .collect();
        Self { pattern, segments }
    }

    /// The original pattern string
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn matches(&self, logger_name: &str) -> bool {
        let name_segments: Vec<&str> = logger_name.split('.').collect();
        match_segments(&self.segments, &name_segments)
    }
}

impl fmt::Display for LoggerNamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pattern)
    }
}

fn match_segments(pattern: &[PatternSegment], name: &[&str]) -> bool {
    match pattern.first() {
        None => name.is_empty(),
        Some(PatternSegment::Literal(literal)) => match name.first() {
            Some(segment) if segment == literal => match_segments(&pattern[1..], &name[1..]),
            _ => false,
        },
        Some(PatternSegment::Wildcard) => {
            // consume one or more name segments
            (1..=name.len()).any(|taken| match_segments(&pattern[1..], &name[taken..]))
        }
    }
}
