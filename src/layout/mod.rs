//! Layout rendering engine
//!
//! Compiles template strings such as `"${basedir} ${message}"` into renderer
//! node chains and evaluates them against a [`LogEvent`]. Compilation is
//! fallible (syntax, unknown renderer names, self-referential nesting);
//! rendering never fails — unresolvable data degrades to empty output per
//! node.
//!
//! The grammar is literal text interleaved with `${name}` or
//! `${name:option=value:option2=value2}` tokens. Option values may themselves
//! contain `${...}` tokens (nested layouts). `\` escapes the next character
//! inside literal text and option values; a `}` outside any token is literal.

pub mod parser;
pub mod registry;

pub use registry::{RenderFn, RendererRegistry, ResolvedOptions};

use crate::core::error::Result;
use crate::core::log_event::LogEvent;
use std::fmt;
use std::sync::Arc;

/// One compiled element of a layout
#[derive(Debug, Clone, PartialEq)]
pub enum RendererNode {
    /// Verbatim text between tokens
    Literal(String),
    /// A `${name:...}` token; option values are `Literal` text or `Nested`
    /// sub-layouts
    FieldRef {
        name: String,
        options: Vec<(String, RendererNode)>,
    },
    /// A sub-layout used as an option value
    Nested(Vec<RendererNode>),
}

/// A compiled template
///
/// Holds the renderer node chain plus the original template string, which is
/// used for diagnostics and equality. Rendering is pure and safe to call
/// concurrently from multiple worker threads.
#[derive(Clone)]
pub struct Layout {
    template: String,
    nodes: Vec<RendererNode>,
    registry: Arc<RendererRegistry>,
}

impl Layout {
    /// Compile a template against the process-wide default registry
    pub fn compile(template: &str) -> Result<Self> {
        Self::compile_with(template, RendererRegistry::global())
    }

    /// Compile a template against a specific registry
    pub fn compile_with(template: &str, registry: &Arc<RendererRegistry>) -> Result<Self> {
        let nodes = parser::parse(template, registry)?;
        Ok(Self {
            template: template.to_string(),
            nodes,
            registry: Arc::clone(registry),
        })
    }

    /// The original template string
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The compiled node chain
    pub fn nodes(&self) -> &[RendererNode] {
        &self.nodes
    }

    /// Render against an event; never fails
    pub fn render(&self, event: &LogEvent) -> String {
        let mut out = String::with_capacity(self.template.len() + 32);
        render_nodes(&self.nodes, event, &self.registry, &mut out);
        out
    }
}

impl PartialEq for Layout {
    fn eq(&self, other: &Self) -> bool {
        self.template == other.template
    }
}

impl Eq for Layout {}

impl fmt::Debug for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layout")
            .field("template", &self.template)
            .field("nodes", &self.nodes.len())
            .finish()
    }
}

fn render_nodes(
    nodes: &[RendererNode],
    event: &LogEvent,
    registry: &RendererRegistry,
    out: &mut String,
) {
    for node in nodes {
        match node {
            RendererNode::Literal(text) => out.push_str(text),
            RendererNode::Nested(children) => render_nodes(children, event, registry, out),
            RendererNode::FieldRef { name, options } => {
                let mut resolved = Vec::with_capacity(options.len());
                for (key, value) in options {
                    let text = match value {
                        RendererNode::Literal(text) => text.clone(),
                        other => {
                            let mut sub = String::new();
                            render_nodes(std::slice::from_ref(other), event, registry, &mut sub);
                            sub
                        }
                    };
                    resolved.push((key.clone(), text));
                }
                let resolved = ResolvedOptions::new(resolved);
                if let Some(render) = registry.get(name) {
                    out.push_str(&render(event, &resolved));
                }
            }
        }
    }
}
