//! @acp:module "Build Command"
//! @acp:summary "Build the selected profiles"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Implements `tessera build`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use console::style;

use crate::build::{BuildOptions, Orchestrator};
use crate::config::Config;
use crate::report::Reporter;

/// Options for the build command
#[derive(Debug, Clone)]
pub struct BuildCommandOptions {
    /// Folder the config's roots are relative to
    pub root: PathBuf,
    /// Profiles to build, all when empty
    pub profiles: Vec<String>,
    /// Ignore previous outputs
    pub full: bool,
    /// Suppress progress rows
    pub quiet: bool,
}

/// Execute the build command
pub async fn execute_build(options: BuildCommandOptions, config: Config) -> Result<()> {
    if !options.quiet {
        println!("{} Building from {}...", style("→").cyan(), config.src.display());
    }

    let mut orchestrator =
        Orchestrator::new(&config, &options.root).with_reporter(Reporter::new(options.quiet));
    let summary = orchestrator
        .run(&BuildOptions {
            full_build: options.full,
            profiles: options.profiles,
        })
        .await
        .context("Build failed")?;

    println!(
        "{} {} units in {} collections ({} built, {} current)",
        style("✓").green(),
        summary.units(),
        summary.collections,
        summary.built,
        summary.skipped
    );
    for preamble in &summary.preambles {
        println!("  {} {}", style("•").dim(), preamble.display());
    }

    Ok(())
}
