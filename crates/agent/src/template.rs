//! Prompt construction.
//!
//! The prompt skeleton is a fixed string with two slots, `{tools}` and
//! `{query}`. `fill` walks the skeleton exactly once, left to right, and
//! emits substituted values verbatim without rescanning them — so
//! placeholder-like text inside user input or tool descriptions stays
//! literal data and cannot change the prompt's structure.

use confab_tools::ToolCatalog;

/// The skeleton every user message is rendered through.
const PROMPT_SKELETON: &str = "\
You can draw on the following tools when they would help the user:

{tools}

Mention a tool by name only when it genuinely fits the request; otherwise respond directly.

User message:
{query}";

/// Renders user queries into the fixed prompt shape.
///
/// The tool block is rendered once at construction; `render` is pure and
/// deterministic after that — the same query always yields the same prompt.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    tool_block: String,
}

impl PromptTemplate {
    /// Build a template over the given catalog.
    pub fn new(catalog: &ToolCatalog) -> Self {
        Self {
            tool_block: render_tool_block(catalog),
        }
    }

    /// Render a user query into the full prompt text.
    pub fn render(&self, query: &str) -> String {
        fill(
            PROMPT_SKELETON,
            &[("tools", &self.tool_block), ("query", query)],
        )
    }
}

/// Render the catalog into the bulleted block the skeleton embeds.
fn render_tool_block(catalog: &ToolCatalog) -> String {
    if catalog.is_empty() {
        return "(no tools configured)".into();
    }

    let mut block = String::new();
    for tool in catalog.iter() {
        if !block.is_empty() {
            block.push('\n');
        }
        block.push_str("- ");
        block.push_str(&tool.name);
        block.push_str(": ");
        block.push_str(&tool.description);
        for param in &tool.parameters {
            block.push_str("\n  - ");
            block.push_str(&param.name);
            if param.required {
                block.push_str(" (required)");
            }
            block.push_str(": ");
            block.push_str(&param.description);
        }
    }
    block
}

/// Single-pass slot substitution.
///
/// Only `template` is ever scanned; values land in the output untouched.
/// Unknown or unterminated braces are kept literally.
fn fill(template: &str, slots: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let key = &after[..close];
                match slots.iter().find(|(name, _)| *name == key) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}
