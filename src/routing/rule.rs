//! Routing rules

use super::pattern::LoggerNamePattern;
use crate::core::log_event::LogEvent;
use crate::core::log_level::LogLevel;
use crate::delivery::AsyncSinkWrapper;
use crate::filters::{FilterChain, FilterRule};
use std::sync::Arc;

/// One entry in the routing table: logger pattern, level range, filter
/// chain, and the sinks this rule writes to
///
/// Rules are evaluated in declared order. A rule marked `final` stops table
/// iteration once its pattern and level range match, regardless of its
/// filter verdict; non-final rules let matching continue so sinks accumulate.
#[derive(Debug, Clone)]
pub struct RoutingRule {
    pattern: LoggerNamePattern,
    min_level: LogLevel,
    max_level: LogLevel,
    filters: FilterChain,
    sinks: Vec<Arc<AsyncSinkWrapper>>,
    final_rule: bool,
}

impl RoutingRule {
    pub fn new(pattern: impl Into<String>, min_level: LogLevel) -> Self {
        Self {
            pattern: LoggerNamePattern::new(pattern),
            min_level,
            max_level: LogLevel::max(),
            filters: FilterChain::new(),
            sinks: Vec::new(),
            final_rule: false,
        }
    }

    #[must_use]
    pub fn with_max_level(mut self, max_level: LogLevel) -> Self {
        self.max_level = max_level;
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: FilterRule) -> Self {
        self.filters.push(filter);
        self
    }

    #[must_use]
    pub fn with_filters(mut self, filters: FilterChain) -> Self {
        self.filters = filters;
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<AsyncSinkWrapper>) -> Self {
        self.sinks.push(sink);
        self
    }

    #[must_use]
    pub fn with_final(mut self, final_rule: bool) -> Self {
        self.final_rule = final_rule;
        self
    }

    pub fn pattern(&self) -> &LoggerNamePattern {
        &self.pattern
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn max_level(&self) -> LogLevel {
        self.max_level
    }

    pub fn filters(&self) -> &FilterChain {
        &self.filters
    }

    pub fn sinks(&self) -> &[Arc<AsyncSinkWrapper>] {
        &self.sinks
    }

    pub fn is_final(&self) -> bool {
        self.final_rule
    }

    /// Pattern and level gate; filters are evaluated separately by the router
    pub fn matches(&self, event: &LogEvent) -> bool {
        event.level >= self.min_level
            && event.level <= self.max_level
            && self.pattern.matches(&event.logger_name)
    }
}
