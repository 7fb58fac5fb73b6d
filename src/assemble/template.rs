//! @acp:module "Unit Template"
//! @acp:summary "Parse a bundle template into text and `<<slot>>` chunks"
//! @acp:domain build
//! @acp:layer utility
//!
//! Slots are filled into a side table and rendered once at the end, so text
//! injected into one slot is never scanned for further slots.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Template used when the unit has no custom template
pub const DEFAULT_TEMPLATE: &str = include_str!("../../templates/unit.js");

static SLOT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<<([a-z]+)>>").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
enum Chunk {
    Text(String),
    Slot(String),
}

/// @acp:summary "Parsed bundle template"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    chunks: Vec<Chunk>,
}

impl Template {
    pub fn parse(text: &str) -> Self {
        let mut chunks = Vec::new();
        let mut last = 0;
        for caps in SLOT_PATTERN.captures_iter(text) {
            let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
            if whole.start > last {
                chunks.push(Chunk::Text(text[last..whole.start].to_string()));
            }
            chunks.push(Chunk::Slot(caps[1].to_string()));
            last = whole.end;
        }
        if last < text.len() {
            chunks.push(Chunk::Text(text[last..].to_string()));
        }
        Self { chunks }
    }

    pub fn has_slot(&self, name: &str) -> bool {
        self.chunks
            .iter()
            .any(|c| matches!(c, Chunk::Slot(slot) if slot == name))
    }

    /// Render with slot values; unknown slots stay as written
    pub fn render(&self, values: &HashMap<&str, String>) -> String {
        let mut out = String::new();
        for chunk in &self.chunks {
            match chunk {
                Chunk::Text(text) => out.push_str(text),
                Chunk::Slot(name) => match values.get(name.as_str()) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push_str("<<");
                        out.push_str(name);
                        out.push_str(">>");
                    }
                },
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_does_not_rescan_values() {
        let template = Template::parse("a <<includes>> b <<globals>> c");
        let values = HashMap::from([
            ("includes", "<<globals>>".to_string()),
            ("globals", "G".to_string()),
        ]);
        assert_eq!(template.render(&values), "a <<globals>> b G c");
    }

    #[test]
    fn test_unknown_slots_kept() {
        let template = Template::parse("<<custom>>!");
        assert_eq!(template.render(&HashMap::new()), "<<custom>>!");
    }

    #[test]
    fn test_default_template_slots() {
        let template = Template::parse(DEFAULT_TEMPLATE);
        for slot in ["name", "unit", "includes", "globals", "components", "resources", "types", "manifest"] {
            assert!(template.has_slot(slot), "missing {}", slot);
        }
    }
}
