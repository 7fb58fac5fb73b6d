//! @acp:module "Commands"
//! @acp:summary "CLI command implementations"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Each command is in its own submodule. Commands return `anyhow::Result`
//! and are the only place library errors are turned into user output.

pub mod build;
pub mod init;
pub mod plan;

pub use build::{execute_build, BuildCommandOptions};
pub use init::{execute_init, InitOptions};
pub use plan::{execute_plan, PlanOptions};
