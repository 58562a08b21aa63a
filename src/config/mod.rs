//! Configuration model and pipeline builder
//!
//! The shapes here are what an external configuration loader delivers: an
//! ordered rule list naming sinks by identifier, each sink carrying a type
//! identifier, init parameters, an optional pre-write layout template, and
//! optional queue/retry parameters. [`build_table`] turns one such
//! configuration into a running [`RuleTable`] via the [`SinkRegistry`]
//! constructor map; no reflection, unknown type identifiers are
//! configuration errors.

use crate::core::error::{LoggerError, Result};
use crate::core::log_level::LogLevel;
use crate::core::overflow_policy::OverflowPolicy;
use crate::core::sink::Sink;
use crate::delivery::{AsyncSinkConfig, AsyncSinkWrapper, Backoff, Jitter, RetryPolicy};
use crate::dispatcher::Dispatcher;
use crate::filters::{FilterAction, FilterCondition, FilterRule};
use crate::layout::{Layout, RendererRegistry};
use crate::routing::{RoutingRule, RuleTable};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Root configuration: sink definitions plus the ordered rule list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

impl LoggingConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// One sink definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Identifier rules refer to in `write_to`
    pub name: String,
    /// Type identifier resolved through the [`SinkRegistry`]
    pub kind: String,
    #[serde(default)]
    pub params: HashMap<String, String>,
    /// Pre-write layout template; absent for structured sinks that consume
    /// the raw event
    #[serde(default)]
    pub layout: Option<String>,
    #[serde(default)]
    pub queue: Option<QueueParams>,
}

/// Queue and retry parameters for one sink's wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueParams {
    #[serde(default = "default_queue_size")]
    pub queue_size: usize,
    /// `"block"`, `"discard-oldest"`, `"discard-new"`, or `"grow"`
    #[serde(default = "default_overflow_policy")]
    pub overflow_policy: String,
    /// Only meaningful with `"block"`
    #[serde(default)]
    pub block_timeout_ms: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,
    #[serde(default = "default_jitter")]
    pub jitter: bool,
}

fn default_queue_size() -> usize {
    10_000
}

fn default_overflow_policy() -> String {
    "discard-new".to_string()
}

fn default_max_attempts() -> usize {
    3
}

fn default_backoff_base_ms() -> u64 {
    100
}

fn default_backoff_max_ms() -> u64 {
    5_000
}

fn default_jitter() -> bool {
    true
}

impl Default for QueueParams {
    fn default() -> Self {
        Self {
            queue_size: default_queue_size(),
            overflow_policy: default_overflow_policy(),
            block_timeout_ms: 0,
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_max_ms: default_backoff_max_ms(),
            jitter: default_jitter(),
        }
    }
}

impl QueueParams {
    pub fn build(&self) -> Result<AsyncSinkConfig> {
        let overflow_policy = OverflowPolicy::from_name(
            &self.overflow_policy,
            Duration::from_millis(self.block_timeout_ms),
        )?;
        let retry = RetryPolicy::new(
            self.max_attempts,
            Backoff::Exponential {
                base: Duration::from_millis(self.backoff_base_ms),
                max: Duration::from_millis(self.backoff_max_ms),
            },
            if self.jitter { Jitter::Full } else { Jitter::None },
        );
        Ok(AsyncSinkConfig {
            queue_size: self.queue_size,
            overflow_policy,
            retry,
        })
    }
}

/// One routing rule as configured
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Logger-name glob, e.g. `"app.*"`
    pub logger: String,
    #[serde(default = "default_min_level")]
    pub min_level: LogLevel,
    #[serde(default = "default_max_level")]
    pub max_level: LogLevel,
    /// Sink names this rule writes to, in order
    #[serde(default)]
    pub write_to: Vec<String>,
    #[serde(default, rename = "final")]
    pub final_rule: bool,
    #[serde(default)]
    pub filters: Vec<FilterConfig>,
}

fn default_min_level() -> LogLevel {
    LogLevel::Trace
}

fn default_max_level() -> LogLevel {
    LogLevel::Fatal
}

/// One filter as configured
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    pub layout: String,
    /// `"contains"`, `"not-contains"`, `"equals"`, `"not-equals"`, or
    /// `"matches"` (regex)
    pub condition: String,
    pub value: String,
    pub action: FilterAction,
    #[serde(default)]
    pub ignore_case: bool,
}

impl FilterConfig {
    pub fn build(&self, renderers: &Arc<RendererRegistry>) -> Result<FilterRule> {
        let layout = Layout::compile_with(&self.layout, renderers)?;
        let condition = match self.condition.as_str() {
            "contains" => FilterCondition::Contains {
                substring: self.value.clone(),
                ignore_case: self.ignore_case,
            },
            "not-contains" => FilterCondition::NotContains {
                substring: self.value.clone(),
                ignore_case: self.ignore_case,
            },
            "equals" => FilterCondition::Equals {
                value: self.value.clone(),
                ignore_case: self.ignore_case,
            },
            "not-equals" => FilterCondition::NotEquals {
                value: self.value.clone(),
                ignore_case: self.ignore_case,
            },
            "matches" => FilterCondition::Matches(Regex::new(&self.value).map_err(|e| {
                LoggerError::config("filter", format!("invalid regex '{}': {}", self.value, e))
            })?),
            other => {
                return Err(LoggerError::config(
                    "filter",
                    format!("unknown condition '{}'", other),
                ))
            }
        };
        Ok(FilterRule::new(layout, condition, self.action))
    }
}

/// Constructor for one sink type
pub type SinkFactory = Arc<dyn Fn(&SinkConfig) -> Result<Box<dyn Sink>> + Send + Sync>;

/// Type-identifier to constructor map
///
/// Populated at startup; [`build_table`] resolves every `SinkConfig::kind`
/// through it.
pub struct SinkRegistry {
    factories: HashMap<String, SinkFactory>,
}

impl SinkRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry with constructors for the bundled sinks
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        #[cfg(feature = "console")]
        registry.register("console", |_config| {
            Ok(Box::new(crate::sinks::ConsoleSink::new()))
        });

        #[cfg(feature = "file")]
        registry.register("file", |config| {
            let path = config.params.get("path").ok_or_else(|| {
                LoggerError::config(
                    "file sink",
                    format!("sink '{}' requires a 'path' parameter", config.name),
                )
            })?;
            Ok(Box::new(crate::sinks::FileSink::new(path)))
        });

        registry.register("memory", |_config| {
            Ok(Box::new(crate::sinks::MemorySink::new()))
        });

        registry
    }

    pub fn register(
        &mut self,
        kind: impl Into<String>,
        factory: impl Fn(&SinkConfig) -> Result<Box<dyn Sink>> + Send + Sync + 'static,
    ) {
        self.factories.insert(kind.into(), Arc::new(factory));
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    pub fn build(&self, config: &SinkConfig) -> Result<Box<dyn Sink>> {
        let factory = self.factories.get(&config.kind).ok_or_else(|| {
            LoggerError::config(
                "sinks",
                format!("unknown sink type '{}' for '{}'", config.kind, config.name),
            )
        })?;
        factory(config)
    }
}

impl Default for SinkRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for SinkRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        f.debug_struct("SinkRegistry").field("kinds", &kinds).finish()
    }
}

/// Build a dispatcher from a configuration
pub fn build_dispatcher(
    config: &LoggingConfig,
    sinks: &SinkRegistry,
    renderers: &Arc<RendererRegistry>,
) -> Result<Dispatcher> {
    Ok(Dispatcher::new(build_table(config, sinks, renderers, None)?))
}

/// Build a rule table from a configuration
///
/// Sinks that fail to initialize are marked unavailable: one diagnostic goes
/// to stderr, and rules referencing them silently drop that sink from their
/// contribution. Referencing a sink that was never configured is a hard
/// configuration error. Passing the previously active table reuses its
/// wrappers by sink name, so a reload does not tear down queues that the new
/// table still references.
pub fn build_table(
    config: &LoggingConfig,
    sinks: &SinkRegistry,
    renderers: &Arc<RendererRegistry>,
    previous: Option<&RuleTable>,
) -> Result<RuleTable> {
    let mut wrappers: HashMap<String, Arc<AsyncSinkWrapper>> = HashMap::new();
    let mut configured: Vec<&str> = Vec::new();

    for sink_config in &config.sinks {
        configured.push(&sink_config.name);

        if let Some(existing) = previous.and_then(|table| table.wrapper(&sink_config.name)) {
            wrappers.insert(sink_config.name.clone(), existing);
            continue;
        }

        let mut sink = sinks.build(sink_config)?;
        if let Err(e) = sink.initialize(&sink_config.params) {
            eprintln!(
                "[LOGROUTER ERROR] sink '{}' failed to initialize and was disabled: {}",
                sink_config.name, e
            );
            continue;
        }

        let layout = match &sink_config.layout {
            Some(template) => Some(Layout::compile_with(template, renderers)?),
            None => None,
        };
        let wrapper_config = match &sink_config.queue {
            Some(params) => params.build()?,
            None => AsyncSinkConfig::default(),
        };

        wrappers.insert(
            sink_config.name.clone(),
            AsyncSinkWrapper::spawn(sink_config.name.as_str(), sink, layout, wrapper_config),
        );
    }

    let mut rules = Vec::with_capacity(config.rules.len());
    for rule_config in &config.rules {
        let mut rule = RoutingRule::new(rule_config.logger.as_str(), rule_config.min_level)
            .with_max_level(rule_config.max_level)
            .with_final(rule_config.final_rule);

        for filter_config in &rule_config.filters {
            rule = rule.with_filter(filter_config.build(renderers)?);
        }

        for sink_name in &rule_config.write_to {
            match wrappers.get(sink_name.as_str()) {
                Some(wrapper) => rule = rule.with_sink(Arc::clone(wrapper)),
                None if configured.contains(&sink_name.as_str()) => {
                    // sink failed to initialize; already reported, drop it
                }
                None => {
                    return Err(LoggerError::config(
                        "rules",
                        format!(
                            "rule '{}' references unknown sink '{}'",
                            rule_config.logger, sink_name
                        ),
                    ))
                }
            }
        }

        rules.push(rule);
    }

    Ok(RuleTable::new(rules))
}
