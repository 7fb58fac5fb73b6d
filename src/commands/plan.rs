//! @acp:module "Plan Command"
//! @acp:summary "Print the collection → group → unit hierarchy without building"
//! @acp:domain cli
//! @acp:layer handler

use std::path::PathBuf;

use anyhow::Result;
use console::style;

use crate::config::Config;
use crate::plan::load_plan;

/// Options for the plan command
#[derive(Debug, Clone)]
pub struct PlanOptions {
    pub root: PathBuf,
    pub profiles: Vec<String>,
}

/// Execute the plan command
pub fn execute_plan(options: PlanOptions, config: Config) -> Result<()> {
    let plan = load_plan(&config, &options.root, &options.profiles)?;

    for collection in &plan.collections {
        println!(
            "{} {} {} → {} (preamble: {:?})",
            style("→").cyan(),
            style(&collection.name).bold(),
            collection.src.display(),
            collection.dest.display(),
            collection.preamble
        );
        for group in &collection.groups {
            println!("  {} ({} units)", style(&group.name).cyan(), group.units.len());
            for unit in &group.units {
                println!("    {} {}", style("•").dim(), unit.name());
            }
        }
    }

    println!(
        "{} {} units in {} collections",
        style("✓").green(),
        plan.unit_count(),
        plan.collections.len()
    );
    Ok(())
}
