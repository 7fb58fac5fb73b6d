//! @acp:module "Metadata Injection"
//! @acp:summary "Side table of metadata lines rendered above definition lines"
//! @acp:domain build
//! @acp:layer utility

use std::collections::BTreeMap;

/// Lines to insert, keyed by the byte offset of the line they precede
#[derive(Debug, Default)]
pub struct Injections {
    at: BTreeMap<usize, Vec<String>>,
}

impl Injections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, line_start: usize, lines: Vec<String>) {
        self.at.entry(line_start).or_default().extend(lines);
    }

    /// Copy `source` with every entry placed above its line, using that
    /// line's indentation
    pub fn render(&self, source: &str) -> String {
        let extra: usize = self.at.values().flatten().map(|l| l.len() + 8).sum();
        let mut out = String::with_capacity(source.len() + extra);
        let mut last = 0;
        for (&offset, lines) in &self.at {
            let offset = offset.min(source.len());
            out.push_str(&source[last..offset]);
            let rest = &source[offset..];
            let indent = &rest[..rest.len() - rest.trim_start_matches([' ', '\t']).len()];
            for line in lines {
                out.push_str(indent);
                out.push_str(line);
                out.push('\n');
            }
            last = offset;
        }
        out.push_str(&source[last..]);
        out
    }
}

fn quoted(text: &str) -> String {
    serde_json::Value::String(text.to_string()).to_string()
}

/// Host id, detected kind and qualified name of one member
pub fn metadata_lines(host_id: &str, kind: &str, qualified_name: &str) -> Vec<String> {
    vec![
        format!("tessera.meta('host', {});", quoted(host_id)),
        format!("tessera.meta('kind', {});", quoted(kind)),
        format!("tessera.meta('name', {});", quoted(qualified_name)),
    ]
}
