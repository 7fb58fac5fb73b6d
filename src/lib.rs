#![forbid(unsafe_code)]

//! @acp:module "Tessera Library"
//! @acp:summary "Convention-driven bundle build orchestrator"
//! @acp:domain build
//! @acp:layer api
//! @acp:stability stable
//!
//! # Tessera
//!
//! Turns a convention-governed source tree into bundle artifacts.
//!
//! ## Features
//!
//! - **Build plan**: profiles → groups → units, discovered from folders
//! - **Classification**: ordering, in-place asset and locale filename markers
//! - **Incremental**: units whose sources are older than their output are skipped
//! - **Assembly**: fixed stages fill a template, then lint, minify, scramble and gzip
//!
//! ## Example
//!
//! ```rust,no_run
//! use tessera::{BuildOptions, Config, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("tessera.json")?;
//!     let mut orchestrator = Orchestrator::new(&config, ".");
//!
//!     let summary = orchestrator.run(&BuildOptions::default()).await?;
//!     println!("{} units built", summary.built);
//!
//!     Ok(())
//! }
//! ```

pub mod assemble;
pub mod build;
pub mod cache;
pub mod commands;
pub mod config;
pub mod error;
pub mod hooks;
pub mod parse;
pub mod plan;
pub mod preamble;
pub mod report;
pub mod scan;
pub mod tools;
pub mod unit;

// Re-exports
pub use assemble::{Assembler, UnitOutcome};
pub use build::{BuildOptions, BuildSummary, Orchestrator};
pub use cache::{AssetEntry, Manifest, NameRegistry, NamespaceEntry, RouteEntry, TypeEntry};
pub use config::{Config, Profile};
pub use error::{Result, TesseraError};
pub use hooks::HookRunner;
pub use parse::{detect_definition, Detection, DefinitionKind};
pub use plan::{load_plan, BuildPlan, UnitBuilder};
pub use report::Reporter;
pub use scan::{Classification, Classifier, SourceFile};
pub use tools::Toolchain;
pub use unit::Unit;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
