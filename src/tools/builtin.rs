//! @acp:module "Built-in Tools"
//! @acp:summary "In-process lint and minify for scripts, style sheets and JSON"
//! @acp:domain build
//! @acp:layer service

use std::path::Path;

use super::{Linter, Minified, Minifier};
use crate::error::{Result, TesseraError};
use crate::parse::{self, Syntax};

/// Bracket balance for scripts and style sheets, well-formedness for JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinLinter;

impl Linter for BuiltinLinter {
    fn lint(&self, kind: &str, file: &Path) -> Result<Option<String>> {
        if kind == "json" {
            let content = std::fs::read_to_string(file)?;
            return Ok(serde_json::from_str::<serde_json::Value>(&content)
                .err()
                .map(|e| e.to_string()));
        }
        match Syntax::for_extension(kind) {
            Some(syntax) => {
                let content = std::fs::read_to_string(file)?;
                Ok(parse::check_balance(&content, syntax))
            }
            None => Ok(None),
        }
    }
}

/// Comment and whitespace stripping; JSON is re-serialized compactly
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinMinifier;

impl Minifier for BuiltinMinifier {
    fn minify(&self, kind: &str, source: &str, file: &Path) -> Result<Minified> {
        let code = if kind == "json" {
            let value: serde_json::Value = serde_json::from_str(source)
                .map_err(|e| TesseraError::processing(file, e.to_string()))?;
            serde_json::to_string(&value)?
        } else {
            match Syntax::for_extension(kind) {
                Some(syntax) => parse::minify(source, syntax),
                None => source.to_string(),
            }
        };
        Ok(Minified { code, map: None })
    }
}
