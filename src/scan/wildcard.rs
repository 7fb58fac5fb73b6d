//! @acp:module "Wildcards"
//! @acp:summary "Compiled glob pattern lists used by every exclusion rule"
//! @acp:domain build
//! @acp:layer utility

use glob::{MatchOptions, Pattern};

use crate::error::Result;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// A list of wildcard patterns; matches when any pattern matches
#[derive(Debug, Clone, Default)]
pub struct Wildcards {
    patterns: Vec<Pattern>,
}

impl Wildcards {
    /// Compile patterns; an invalid pattern is a configuration mistake
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| Pattern::new(p.as_ref()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn matches(&self, text: &str) -> bool {
        self.patterns
            .iter()
            .any(|p| p.matches_with(text, MATCH_OPTIONS))
    }

    /// Match a relative path or its last segment
    pub fn matches_path(&self, rel: &str) -> bool {
        if self.matches(rel) {
            return true;
        }
        match rel.rsplit('/').next() {
            Some(name) if name != rel => self.matches(name),
            _ => false,
        }
    }
}
