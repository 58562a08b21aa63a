//! Filter rules and chains
//!
//! A routing rule carries an ordered chain of filter rules. Each filter
//! renders its layout against the event and compares the result to its
//! configured value; the first rule producing a decisive action settles the
//! chain. Filter evaluation never fails: rendering is infallible and regexes
//! are compiled at configuration time, so the worst case is a non-match.

use crate::core::log_event::LogEvent;
use crate::layout::Layout;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Action a filter rule takes when its condition matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterAction {
    /// Deliver to this rule's sinks; stops chain evaluation
    Accept,
    /// Force delivery; equivalent to Accept at chain level
    Log,
    /// Suppress this rule's sinks; stops chain evaluation
    Ignore,
    /// No opinion; defer to the next filter or the rule's level gate
    Neutral,
}

impl fmt::Display for FilterAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterAction::Accept => write!(f, "Accept"),
            FilterAction::Log => write!(f, "Log"),
            FilterAction::Ignore => write!(f, "Ignore"),
            FilterAction::Neutral => write!(f, "Neutral"),
        }
    }
}

/// Result of evaluating a whole chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterVerdict {
    Accept,
    Ignore,
    Neutral,
}

/// Comparison applied to the rendered layout output
#[derive(Debug, Clone)]
pub enum FilterCondition {
    Contains { substring: String, ignore_case: bool },
    NotContains { substring: String, ignore_case: bool },
    Equals { value: String, ignore_case: bool },
    NotEquals { value: String, ignore_case: bool },
    Matches(Regex),
}

impl FilterCondition {
    fn evaluate(&self, rendered: &str) -> bool {
        fn contains(haystack: &str, needle: &str, ignore_case: bool) -> bool {
            if ignore_case {
                haystack.to_lowercase().contains(&needle.to_lowercase())
            } else {
                haystack.contains(needle)
            }
        }
        fn equals(left: &str, right: &str, ignore_case: bool) -> bool {
            if ignore_case {
                left.eq_ignore_ascii_case(right)
            } else {
                left == right
            }
        }

        match self {
            FilterCondition::Contains {
                substring,
                ignore_case,
            } => contains(rendered, substring, *ignore_case),
            FilterCondition::NotContains {
                substring,
                ignore_case,
            } => !contains(rendered, substring, *ignore_case),
            FilterCondition::Equals { value, ignore_case } => {
                equals(rendered, value, *ignore_case)
            }
            FilterCondition::NotEquals { value, ignore_case } => {
                !equals(rendered, value, *ignore_case)
            }
            FilterCondition::Matches(regex) => regex.is_match(rendered),
        }
    }
}

/// One filter: a layout selector, a condition, and the action on match
#[derive(Debug, Clone)]
pub struct FilterRule {
    layout: Layout,
    condition: FilterCondition,
    action: FilterAction,
}

impl FilterRule {
    pub fn new(layout: Layout, condition: FilterCondition, action: FilterAction) -> Self {
        Self {
            layout,
            condition,
            action,
        }
    }

    /// Filter matching when the rendered layout contains a substring
    pub fn when_contains(
        layout: Layout,
        substring: impl Into<String>,
        action: FilterAction,
    ) -> Self {
        Self::new(
            layout,
            FilterCondition::Contains {
                substring: substring.into(),
                ignore_case: false,
            },
            action,
        )
    }

    /// Filter matching when the rendered layout does not contain a substring
    pub fn when_not_contains(
        layout: Layout,
        substring: impl Into<String>,
        action: FilterAction,
    ) -> Self {
        Self::new(
            layout,
            FilterCondition::NotContains {
                substring: substring.into(),
                ignore_case: false,
            },
            action,
        )
    }

    /// Filter matching when the rendered layout equals a value
    pub fn when_equals(layout: Layout, value: impl Into<String>, action: FilterAction) -> Self {
        Self::new(
            layout,
            FilterCondition::Equals {
                value: value.into(),
                ignore_case: false,
            },
            action,
        )
    }

    /// Filter matching when the rendered layout matches a regex
    pub fn when_matches(layout: Layout, regex: Regex, action: FilterAction) -> Self {
        Self::new(layout, FilterCondition::Matches(regex), action)
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn action(&self) -> FilterAction {
        self.action
    }

    /// This rule's contribution for one event: its action on match, Neutral
    /// otherwise
    pub fn evaluate(&self, event: &LogEvent) -> FilterAction {
        let rendered = self.layout.render(event);
        if self.condition.evaluate(&rendered) {
            self.action
        } else {
            FilterAction::Neutral
        }
    }
}

/// Ordered sequence of filter rules attached to one routing rule
#[derive(Debug, Clone, Default)]
pub struct FilterChain {
    rules: Vec<FilterRule>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    #[must_use]
    pub fn with_rule(mut self, rule: FilterRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn push(&mut self, rule: FilterRule) {
        self.rules.push(rule);
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Walk the chain in order; the first Accept/Log/Ignore settles the
    /// verdict, an all-Neutral chain defers to the rule's level gate
    pub fn evaluate(&self, event: &LogEvent) -> FilterVerdict {
        for rule in &self.rules {
            match rule.evaluate(event) {
                FilterAction::Accept | FilterAction::Log => return FilterVerdict::Accept,
                FilterAction::Ignore => return FilterVerdict::Ignore,
                FilterAction::Neutral => {}
            }
        }
        FilterVerdict::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;
    use crate::layout::RendererRegistry;
    use std::sync::Arc;

    fn message_layout() -> Layout {
        let registry = Arc::new(RendererRegistry::with_defaults());
        Layout::compile_with("${message}", &registry).unwrap()
    }

    fn event(message: &str) -> LogEvent {
        LogEvent::new("app", LogLevel::Info, message)
    }

    #[test]
    fn test_when_contains_ignore() {
        let rule = FilterRule::when_contains(message_layout(), "zzz", FilterAction::Ignore);
        assert_eq!(rule.evaluate(&event("zzz happened")), FilterAction::Ignore);
        assert_eq!(rule.evaluate(&event("all quiet")), FilterAction::Neutral);
    }

    #[test]
    fn test_chain_short_circuit() {
        let chain = FilterChain::new()
            .with_rule(FilterRule::when_contains(
                message_layout(),
                "keep",
                FilterAction::Accept,
            ))
            .with_rule(FilterRule::when_contains(
                message_layout(),
                "keep",
                FilterAction::Ignore,
            ));
        // first decisive rule wins; the Ignore rule never runs
        assert_eq!(chain.evaluate(&event("keep this")), FilterVerdict::Accept);
    }

    #[test]
    fn test_chain_all_neutral() {
        let chain = FilterChain::new().with_rule(FilterRule::when_contains(
            message_layout(),
            "absent",
            FilterAction::Ignore,
        ));
        assert_eq!(chain.evaluate(&event("hello")), FilterVerdict::Neutral);
    }

    #[test]
    fn test_empty_chain_is_neutral() {
        let chain = FilterChain::new();
        assert_eq!(chain.evaluate(&event("anything")), FilterVerdict::Neutral);
    }

    #[test]
    fn test_log_action_maps_to_accept() {
        let chain = FilterChain::new().with_rule(FilterRule::when_contains(
            message_layout(),
            "audit",
            FilterAction::Log,
        ));
        assert_eq!(chain.evaluate(&event("audit trail")), FilterVerdict::Accept);
    }

    #[test]
    fn test_equals_case_folding() {
        let condition = FilterCondition::Equals {
            value: "ERROR".to_string(),
            ignore_case: true,
        };
        assert!(condition.evaluate("error"));
        assert!(!condition.evaluate("warn"));
    }

    #[test]
    fn test_not_contains() {
        let rule = FilterRule::when_not_contains(message_layout(), "zzz", FilterAction::Accept);
        assert_eq!(rule.evaluate(&event("clean")), FilterAction::Accept);
        assert_eq!(rule.evaluate(&event("zzz noise")), FilterAction::Neutral);
    }

    #[test]
    fn test_regex_match() {
        let rule = FilterRule::when_matches(
            message_layout(),
            Regex::new(r"code=\d{3}").unwrap(),
            FilterAction::Ignore,
        );
        assert_eq!(rule.evaluate(&event("code=404")), FilterAction::Ignore);
        assert_eq!(rule.evaluate(&event("code=x")), FilterAction::Neutral);
    }
}
