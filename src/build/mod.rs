//! @acp:module "Build"
//! @acp:summary "Run options and summary of a build"
//! @acp:domain build
//! @acp:layer service

mod orchestrator;

use std::path::PathBuf;

pub use orchestrator::Orchestrator;

/// @acp:summary "Options of one build run"
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Rebuild every unit; OR-ed with the config's `fullBuild`
    pub full_build: bool,
    /// Profiles to build, every declared profile when empty
    pub profiles: Vec<String>,
}

/// @acp:summary "What a build run produced"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub collections: usize,
    pub built: usize,
    pub skipped: usize,
    pub preambles: Vec<PathBuf>,
}

impl BuildSummary {
    pub fn units(&self) -> usize {
        self.built + self.skipped
    }
}
