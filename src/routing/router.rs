//! Rule router with atomically swappable table snapshots

use super::rule::RoutingRule;
use crate::core::log_event::LogEvent;
use crate::delivery::AsyncSinkWrapper;
use crate::filters::FilterVerdict;
use arc_swap::ArcSwap;
use std::sync::Arc;

/// Immutable, ordered routing table
///
/// Built once per configuration (re)load and never mutated; the router swaps
/// whole tables.
#[derive(Debug, Default)]
pub struct RuleTable {
    rules: Vec<RoutingRule>,
}

impl RuleTable {
    pub fn new(rules: Vec<RoutingRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[RoutingRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All distinct wrappers reachable from this table, in rule order
    pub fn wrappers(&self) -> Vec<Arc<AsyncSinkWrapper>> {
        let mut wrappers: Vec<Arc<AsyncSinkWrapper>> = Vec::new();
        for rule in &self.rules {
            for sink in rule.sinks() {
                if !wrappers.iter().any(|known| known.name() == sink.name()) {
                    wrappers.push(Arc::clone(sink));
                }
            }
        }
        wrappers
    }

    /// Look up a wrapper by sink name
    pub fn wrapper(&self, name: &str) -> Option<Arc<AsyncSinkWrapper>> {
        self.rules
            .iter()
            .flat_map(|rule| rule.sinks())
            .find(|sink| sink.name() == name)
            .map(Arc::clone)
    }
}

/// Matches events against the active rule-table snapshot
///
/// `match_event` dereferences the snapshot exactly once and uses it for the
/// whole call, so concurrent reloads are invisible to in-flight matches:
/// every event sees either the old table or the new one in full.
pub struct Router {
    table: ArcSwap<RuleTable>,
}

impl Router {
    pub fn new(table: RuleTable) -> Self {
        Self {
            table: ArcSwap::from_pointee(table),
        }
    }

    /// The current table snapshot
    pub fn snapshot(&self) -> Arc<RuleTable> {
        self.table.load_full()
    }

    /// Atomically install a new table
    pub fn reload(&self, table: RuleTable) {
        self.table.store(Arc::new(table));
    }

    /// Collect the sinks that must receive this event
    ///
    /// Walks rules in declared order. A rule contributes when its pattern
    /// and level range match and its filter chain does not say Ignore; a
    /// matched rule marked `final` ends the walk whatever its filter verdict.
    /// The result is deduplicated by sink name with insertion order
    /// preserved, so delivery fairness follows rule declaration order.
    pub fn match_event(&self, event: &LogEvent) -> Vec<Arc<AsyncSinkWrapper>> {
        let table = self.table.load();
        let mut matched: Vec<Arc<AsyncSinkWrapper>> = Vec::new();

        for rule in table.rules() {
            if !rule.matches(event) {
                continue;
            }

            match rule.filters().evaluate(event) {
                FilterVerdict::Ignore => {}
                FilterVerdict::Accept | FilterVerdict::Neutral => {
                    for sink in rule.sinks() {
                        if !matched.iter().any(|known| known.name() == sink.name()) {
                            matched.push(Arc::clone(sink));
                        }
                    }
                }
            }

            if rule.is_final() {
                break;
            }
        }

        matched
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let table = self.table.load();
        f.debug_struct("Router")
            .field("rules", &table.rules().len())
            .finish()
    }
}
