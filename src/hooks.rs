//! @acp:module "Hooks"
//! @acp:summary "Pre/post tasks and the docs/tests unit hooks as shell commands"
//! @acp:domain build
//! @acp:layer service
//!
//! Commands run one after another through `sh -c`. The build context is
//! exported as `TESSERA_*` environment variables.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;

use crate::config::HookConfig;
use crate::error::{Result, TesseraError};
use crate::unit::Unit;

/// Plan level a task belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskLevel {
    Profile,
    Group,
    Unit,
}

impl TaskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskLevel::Profile => "profile",
            TaskLevel::Group => "group",
            TaskLevel::Unit => "unit",
        }
    }
}

/// @acp:summary "Context exported to a task"
#[derive(Debug, Clone)]
pub struct TaskContext {
    pub level: TaskLevel,
    pub profile: String,
    pub group: Option<String>,
    pub unit: Option<String>,
    pub src: PathBuf,
    pub dest: PathBuf,
}

impl TaskContext {
    fn env(&self) -> Vec<(&'static str, String)> {
        vec![
            ("TESSERA_LEVEL", self.level.as_str().to_string()),
            ("TESSERA_PROFILE", self.profile.clone()),
            ("TESSERA_GROUP", self.group.clone().unwrap_or_default()),
            ("TESSERA_UNIT", self.unit.clone().unwrap_or_default()),
            ("TESSERA_SRC", self.src.display().to_string()),
            ("TESSERA_DEST", self.dest.display().to_string()),
        ]
    }

    fn for_unit(unit: &Unit) -> Self {
        Self {
            level: TaskLevel::Unit,
            profile: unit.profile.name.clone(),
            group: Some(unit.group.clone()),
            unit: Some(unit.name.clone()),
            src: unit.src.clone(),
            dest: unit.dest.clone(),
        }
    }
}

/// @acp:summary "Runs task lists and the unit hooks"
#[derive(Debug, Clone, Default)]
pub struct HookRunner {
    docs: Option<String>,
    tests: Option<String>,
}

impl HookRunner {
    pub fn new(config: &HookConfig) -> Self {
        Self {
            docs: config.docs.clone(),
            tests: config.tests.clone(),
        }
    }

    /// @acp:summary "Run a task list in order; the first failure aborts"
    pub async fn run_tasks(&self, name: &str, commands: &[String], context: &TaskContext) -> Result<()> {
        for command in commands {
            tracing::info!("Task {} ({}): {}", name, context.level.as_str(), command);
            run_shell(name, command, context.env()).await?;
        }
        Ok(())
    }

    /// Docs hook, when the profile enables it and a command is configured
    pub async fn docs_build(&self, unit: &Unit) -> Result<()> {
        let Some(command) = self.docs.as_deref().filter(|_| unit.profile.docs) else {
            return Ok(());
        };
        let mut env = TaskContext::for_unit(unit).env();
        env.push(("TESSERA_DOCS", unit.docs_dir().display().to_string()));
        run_shell("docs", command, env).await
    }

    /// Tests hook, when the profile enables it and a command is configured
    pub async fn tests_build(&self, unit: &Unit) -> Result<()> {
        let Some(command) = self.tests.as_deref().filter(|_| unit.profile.tests) else {
            return Ok(());
        };
        let mut env = TaskContext::for_unit(unit).env();
        env.push(("TESSERA_TESTS", unit.tests_dir().display().to_string()));
        run_shell("tests", command, env).await
    }
}

async fn run_shell(name: &str, command: &str, env: Vec<(&'static str, String)>) -> Result<()> {
    let output = Command::new("sh")
        .arg("-c")
        .arg(command)
        .envs(env)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| TesseraError::Hook {
            name: name.to_string(),
            message: format!("failed to start '{}': {}", command, e),
        })?;

    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    Err(TesseraError::Hook {
        name: name.to_string(),
        message: if stderr.is_empty() {
            format!("'{}' exited with {}", command, output.status)
        } else {
            format!("'{}' exited with {}: {}", command, output.status, stderr)
        },
    })
}
