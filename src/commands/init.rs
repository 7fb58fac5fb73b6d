//! @acp:module "Init Command"
//! @acp:summary "Create a tessera.json and the source root"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Implements `tessera init`.

use std::path::PathBuf;

use anyhow::{bail, Result};
use console::style;

use crate::config::Config;

/// Options for the init command
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Config file to create
    pub config_path: PathBuf,
    /// Force overwrite existing config
    pub force: bool,
}

/// Execute the init command
pub fn execute_init(options: InitOptions) -> Result<()> {
    if options.config_path.exists() && !options.force {
        bail!(
            "{} already exists. Use --force to overwrite.",
            options.config_path.display()
        );
    }

    let config = Config::default();
    config.save(&options.config_path)?;
    println!(
        "{} Created {}",
        style("✓").green(),
        options.config_path.display()
    );

    let root = options
        .config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let src = root.join(&config.src);
    if !src.exists() {
        std::fs::create_dir_all(&src)?;
        println!("{} Created {}/", style("✓").green(), src.display());
    }

    println!("\n{}", style("Next steps:").bold());
    println!(
        "  1. Add unit folders with {} and {} below {}",
        style("(components)").cyan(),
        style("(types)").cyan(),
        src.display()
    );
    println!("  2. Run {} to bundle them", style("tessera build").cyan());

    Ok(())
}
