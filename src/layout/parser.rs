//! Template tokenizer/parser
//!
//! Produces [`RendererNode`] trees from template strings. The parser is
//! separate from the renderer catalog: it validates names against the
//! registry but attaches no behavior, which keeps the syntax and the catalog
//! independently testable.

use super::registry::RendererRegistry;
use super::RendererNode;
use crate::core::error::{LoggerError, Result};

/// Nesting levels beyond this are rejected as runaway recursion
const MAX_NESTING: usize = 16;

pub fn parse(template: &str, registry: &RendererRegistry) -> Result<Vec<RendererNode>> {
    let mut parser = Parser {
        template,
        chars: template.chars().collect(),
        pos: 0,
        registry,
    };
    let mut renderer_stack = Vec::new();
    parser.parse_sequence(&mut renderer_stack, &[])
}

struct Parser<'a> {
    template: &'a str,
    chars: Vec<char>,
    pos: usize,
    registry: &'a RendererRegistry,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    /// Parse literal runs and tokens until EOF or an unconsumed terminator.
    ///
    /// Terminators are the `:` / `}` characters that belong to an enclosing
    /// token while parsing an option value; the caller consumes them.
    fn parse_sequence(
        &mut self,
        renderer_stack: &mut Vec<String>,
        terminators: &[char],
    ) -> Result<Vec<RendererNode>> {
        let mut nodes = Vec::new();
        let mut literal = String::new();

        while let Some(c) = self.peek() {
            if terminators.contains(&c) {
                break;
            }
            if c == '\\' {
                if let Some(escaped) = self.peek_at(1) {
                    literal.push(escaped);
                    self.pos += 2;
                    continue;
                }
                literal.push(c);
                self.pos += 1;
                continue;
            }
            if c == '$' && self.peek_at(1) == Some('{') {
                if !literal.is_empty() {
                    nodes.push(RendererNode::Literal(std::mem::take(&mut literal)));
                }
                nodes.push(self.parse_token(renderer_stack)?);
                continue;
            }
            literal.push(c);
            self.pos += 1;
        }

        if !literal.is_empty() {
            nodes.push(RendererNode::Literal(literal));
        }
        Ok(nodes)
    }

    /// Parse one `${name:opt=value:...}` token; `pos` is at the `$`.
    fn parse_token(&mut self, renderer_stack: &mut Vec<String>) -> Result<RendererNode> {
        let token_start = self.pos;
        self.pos += 2; // consume "${"

        let name = self.read_name();
        if name.is_empty() {
            return Err(LoggerError::template_syntax(
                self.template,
                token_start,
                "empty renderer name",
            ));
        }
        if !self.registry.contains(&name) {
            return Err(LoggerError::unknown_renderer(name));
        }
        if renderer_stack.iter().any(|entry| entry == &name) {
            return Err(LoggerError::recursive_template(name, self.template));
        }
        if renderer_stack.len() >= MAX_NESTING {
            return Err(LoggerError::recursive_template(name, self.template));
        }

        let mut options = Vec::new();
        while self.peek() == Some(':') {
            self.pos += 1;
            let key = self.read_name();
            if key.is_empty() {
                return Err(LoggerError::template_syntax(
                    self.template,
                    self.pos,
                    "empty option name",
                ));
            }
            let value = if self.peek() == Some('=') {
                self.pos += 1;
                renderer_stack.push(name.clone());
                let value_nodes = self.parse_sequence(renderer_stack, &[':', '}'])?;
                renderer_stack.pop();
                normalize_option_value(value_nodes)
            } else {
                // bare option, e.g. ${logger:shortName}
                RendererNode::Literal("true".to_string())
            };
            options.push((key, value));
        }

        match self.peek() {
            Some('}') => {
                self.pos += 1;
                Ok(RendererNode::FieldRef { name, options })
            }
            _ => Err(LoggerError::template_syntax(
                self.template,
                token_start,
                "unterminated token, missing '}'",
            )),
        }
    }

    /// Read a renderer or option name: alphanumeric plus `-` and `_`
    fn read_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                name.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        name
    }
}

/// Collapse an option value to a single node: plain text stays `Literal`,
/// anything containing tokens becomes `Nested`.
fn normalize_option_value(nodes: Vec<RendererNode>) -> RendererNode {
    match nodes.len() {
        0 => RendererNode::Literal(String::new()),
        1 if matches!(nodes[0], RendererNode::Literal(_)) => {
            nodes.into_iter().next().expect("length checked")
        }
        _ => RendererNode::Nested(nodes),
    }
}
