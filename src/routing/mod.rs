//! Rule-based routing of events to sinks

pub mod pattern;
pub mod router;
pub mod rule;

pub use pattern::LoggerNamePattern;
pub use router::{Router, RuleTable};
pub use rule::RoutingRule;
