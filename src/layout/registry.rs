//! Renderer registry and built-in renderer catalog
//!
//! The registry maps renderer names to render functions. It is populated at
//! startup (built-ins plus any [`register`](RendererRegistry::register) calls)
//! and read-only once compilation begins; the process-wide default lives
//! behind a `OnceLock` and is installed at most once.

use crate::core::error::{LoggerError, Result};
use crate::core::log_event::LogEvent;
use chrono::format::{Item, StrftimeItems};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

static GLOBAL_REGISTRY: OnceLock<Arc<RendererRegistry>> = OnceLock::new();

/// Option values for one token, resolved to plain strings for this render
#[derive(Debug, Default)]
pub struct ResolvedOptions {
    values: Vec<(String, String)>,
}

impl ResolvedOptions {
    pub(crate) fn new(values: Vec<(String, String)>) -> Self {
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Boolean option: `true`, `1`, and `yes` count as set
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.get(key), Some("true") | Some("1") | Some("yes"))
    }
}

/// A renderer: pure function from event and options to text
pub type RenderFn = Arc<dyn Fn(&LogEvent, &ResolvedOptions) -> String + Send + Sync>;

/// Name-to-renderer catalog used at compile time and render time
pub struct RendererRegistry {
    renderers: HashMap<String, RenderFn>,
    base_dir: String,
}

impl RendererRegistry {
    /// Empty registry with no renderers registered
    pub fn empty() -> Self {
        Self {
            renderers: HashMap::new(),
            base_dir: default_base_dir(),
        }
    }

    /// Registry with the built-in renderer catalog installed
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.install_builtins();
        registry
    }

    /// Override the directory rendered by `${basedir}`
    #[must_use]
    pub fn with_base_dir(mut self, dir: impl Into<String>) -> Self {
        self.base_dir = dir.into();
        let base_dir = self.base_dir.clone();
        self.register("basedir", move |_, _| base_dir.clone());
        self
    }

    /// Register a renderer under a name, replacing any existing entry
    pub fn register(
        &mut self,
        name: impl Into<String>,
        render: impl Fn(&LogEvent, &ResolvedOptions) -> String + Send + Sync + 'static,
    ) {
        self.renderers.insert(name.into(), Arc::new(render));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.renderers.contains_key(name)
    }

    pub(crate) fn get(&self, name: &str) -> Option<&RenderFn> {
        self.renderers.get(name)
    }

    /// Registered renderer names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.renderers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The process-wide default registry, initialized with the built-ins on
    /// first use
    pub fn global() -> &'static Arc<RendererRegistry> {
        GLOBAL_REGISTRY.get_or_init(|| Arc::new(Self::with_defaults()))
    }

    /// Install a custom process-wide registry
    ///
    /// Must run before the first `Layout::compile` (or any other access to
    /// [`global`](Self::global)); fails once the global registry exists.
    pub fn install_global(registry: RendererRegistry) -> Result<()> {
        GLOBAL_REGISTRY.set(Arc::new(registry)).map_err(|_| {
            LoggerError::config("renderer_registry", "global registry already initialized")
        })
    }

    fn install_builtins(&mut self) {
        self.register("message", |event, opts| {
            if opts.flag("raw") {
                event.message.clone()
            } else {
                event.formatted_message()
            }
        });

        self.register("level", |event, opts| match opts.get("format") {
            Some("lowercase") => event.level.to_str().to_lowercase(),
            Some("number") => (event.level as u8).to_string(),
            _ => event.level.to_str().to_string(),
        });

        self.register("logger", |event, opts| {
            if opts.flag("shortName") {
                event
                    .logger_name
                    .rsplit('.')
                    .next()
                    .unwrap_or(&event.logger_name)
                    .to_string()
            } else {
                event.logger_name.clone()
            }
        });

        let base_dir = self.base_dir.clone();
        self.register("basedir", move |_, _| base_dir.clone());

        self.register("longdate", |event, _| {
            event
                .timestamp
                .format("%Y-%m-%dT%H:%M:%S%.3fZ")
                .to_string()
        });

        self.register("date", |event, opts| {
            let format = opts.get_or("format", "%Y-%m-%d %H:%M:%S");
            let items: Vec<Item> = StrftimeItems::new(format).collect();
            if items.iter().any(|item| matches!(item, Item::Error)) {
                // malformed format string degrades to the default, never panics
                return event.timestamp.format("%Y-%m-%d %H:%M:%S").to_string();
            }
            event
                .timestamp
                .format_with_items(items.into_iter())
                .to_string()
        });

        self.register("newline", |_, _| "\n".to_string());

        self.register("event-properties", |event, opts| {
            let key = opts.get("name").or_else(|| opts.get("item"));
            match key {
                Some(key) => event
                    .properties
                    .get(key)
                    .map(|value| value.to_string())
                    .unwrap_or_default(),
                None => event.properties.format_fields(),
            }
        });

        self.register("exception", |event, _| {
            event.exception.clone().unwrap_or_default()
        });

        self.register("threadid", |event, _| event.thread_id.clone());

        self.register("uppercase", |_, opts| {
            opts.get_or("inner", "").to_uppercase()
        });

        self.register("lowercase", |_, opts| {
            opts.get_or("inner", "").to_lowercase()
        });
    }
}

impl fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererRegistry")
            .field("renderers", &self.names())
            .field("base_dir", &self.base_dir)
            .finish()
    }
}

fn default_base_dir() -> String {
    std::env::current_dir()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|_| ".".to_string())
}
