//! @acp:module "Command Tools"
//! @acp:summary "Lint and minify through external commands keyed by file kind"
//! @acp:domain build
//! @acp:layer service
//!
//! The file path is appended as the last argument. A lint command fails the
//! lint by exiting non-zero; its combined output becomes the report. A
//! minify command prints the minified code on stdout.

use std::collections::HashMap;
use std::path::Path;
use std::process::{Command, Output};

use super::{Linter, Minified, Minifier};
use crate::config::CommandLine;
use crate::error::{Result, TesseraError};

fn run(command: &CommandLine, file: &Path) -> Result<Output> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| TesseraError::Configuration("empty tool command".to_string()))?;
    tracing::debug!("Running {} {:?} {}", program, args, file.display());
    Command::new(program)
        .args(args)
        .arg(file)
        .output()
        .map_err(|e| TesseraError::processing(file, format!("failed to run {}: {}", program, e)))
}

fn combined(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).to_string();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text.trim_end().to_string()
}

/// Command-backed linter with a fallback for unconfigured kinds
pub struct CommandLinter<F> {
    commands: HashMap<String, CommandLine>,
    fallback: F,
}

impl<F: Linter> CommandLinter<F> {
    pub fn new(commands: HashMap<String, CommandLine>, fallback: F) -> Self {
        Self { commands, fallback }
    }
}

impl<F: Linter> Linter for CommandLinter<F> {
    fn lint(&self, kind: &str, file: &Path) -> Result<Option<String>> {
        let Some(command) = self.commands.get(kind) else {
            return self.fallback.lint(kind, file);
        };
        let output = run(command, file)?;
        if output.status.success() {
            Ok(None)
        } else {
            let report = combined(&output);
            Ok(Some(if report.is_empty() {
                format!("{} exited with {}", command[0], output.status)
            } else {
                report
            }))
        }
    }
}

/// Command-backed minifier with a fallback for unconfigured kinds
pub struct CommandMinifier<F> {
    commands: HashMap<String, CommandLine>,
    fallback: F,
}

impl<F: Minifier> CommandMinifier<F> {
    pub fn new(commands: HashMap<String, CommandLine>, fallback: F) -> Self {
        Self { commands, fallback }
    }
}

impl<F: Minifier> Minifier for CommandMinifier<F> {
    fn minify(&self, kind: &str, source: &str, file: &Path) -> Result<Minified> {
        let Some(command) = self.commands.get(kind) else {
            return self.fallback.minify(kind, source, file);
        };
        let output = run(command, file)?;
        if !output.status.success() {
            return Err(TesseraError::processing(file, combined(&output)));
        }
        Ok(Minified {
            code: String::from_utf8_lossy(&output.stdout).to_string(),
            map: None,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::tools::{BuiltinLinter, BuiltinMinifier};
    use tempfile::TempDir;

    fn commands(kind: &str, line: &[&str]) -> HashMap<String, CommandLine> {
        HashMap::from([(kind.to_string(), line.iter().map(|s| s.to_string()).collect())])
    }

    #[test]
    fn test_failing_lint_command_reports_output() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.js");
        std::fs::write(&file, "x").unwrap();

        let linter = CommandLinter::new(
            commands("js", &["sh", "-c", "echo broken; exit 1", "lint"]),
            BuiltinLinter,
        );
        assert_eq!(linter.lint("js", &file).unwrap(), Some("broken".to_string()));

        let passing = CommandLinter::new(commands("js", &["true"]), BuiltinLinter);
        assert_eq!(passing.lint("js", &file).unwrap(), None);
    }

    #[test]
    fn test_minify_command_output_and_fallback() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.css");
        std::fs::write(&file, ".a {  }").unwrap();

        let minifier = CommandMinifier::new(commands("css", &["cat"]), BuiltinMinifier);
        assert_eq!(minifier.minify("css", "", &file).unwrap().code, ".a {  }");

        let fallback = minifier.minify("json", "{ \"a\": 1 }", &file).unwrap();
        assert_eq!(fallback.code, r#"{"a":1}"#);
    }
}
