//! @acp:module "Orchestrator"
//! @acp:summary "Drive collections, groups and units in declared order"
//! @acp:domain build
//! @acp:layer service
//!
//! Per collection the orchestrator owns the name registry and the preamble
//! lists. Each unit is constructed right before it builds and dropped after
//! its artifacts and manifest are written; only its manifest survives, in
//! the preamble list.

use std::path::{Path, PathBuf};

use super::{BuildOptions, BuildSummary};
use crate::assemble::{Assembler, UnitOutcome};
use crate::cache::{Manifest, NameRegistry};
use crate::config::{Config, PreambleScope};
use crate::error::Result;
use crate::hooks::{HookRunner, TaskContext, TaskLevel};
use crate::plan::{load_plan, Collection, Group};
use crate::preamble::write_preamble;
use crate::report::Reporter;
use crate::tools::Toolchain;

/// @acp:summary "Runs a whole build"
pub struct Orchestrator<'a> {
    config: &'a Config,
    root: PathBuf,
    toolchain: Toolchain,
    hooks: HookRunner,
    reporter: Reporter,
}

impl<'a> Orchestrator<'a> {
    /// `root` is the folder the config's `src`/`dest` are relative to
    pub fn new(config: &'a Config, root: impl Into<PathBuf>) -> Self {
        Self {
            config,
            root: root.into(),
            toolchain: Toolchain::from_config(&config.tools),
            hooks: HookRunner::new(&config.hooks),
            reporter: Reporter::new(false),
        }
    }

    pub fn with_toolchain(mut self, toolchain: Toolchain) -> Self {
        self.toolchain = toolchain;
        self
    }

    pub fn with_reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// @acp:summary "Load the plan and build every selected collection"
    pub async fn run(&mut self, options: &BuildOptions) -> Result<BuildSummary> {
        let plan = load_plan(self.config, &self.root, &options.profiles)?;
        let full_build = options.full_build || self.config.full_build;
        tracing::info!(
            "Building {} units in {} collections{}",
            plan.unit_count(),
            plan.collections.len(),
            if full_build { " (full build)" } else { "" }
        );

        let mut summary = BuildSummary::default();
        self.reporter.start(plan.unit_count());
        let result = self.run_collections(&plan.collections, full_build, &mut summary).await;
        self.reporter.finish();
        result.map(|_| summary)
    }

    async fn run_collections(
        &mut self,
        collections: &[Collection],
        full_build: bool,
        summary: &mut BuildSummary,
    ) -> Result<()> {
        for collection in collections {
            self.run_collection(collection, full_build, summary).await?;
            summary.collections += 1;
        }
        Ok(())
    }

    async fn run_collection(
        &mut self,
        collection: &Collection,
        full_build: bool,
        summary: &mut BuildSummary,
    ) -> Result<()> {
        let tasks = &collection.profile.tasks;
        let context = TaskContext {
            level: TaskLevel::Profile,
            profile: collection.name.clone(),
            group: None,
            unit: None,
            src: collection.src.clone(),
            dest: collection.dest.clone(),
        };

        let dest = collection.dest.display().to_string();
        self.reporter.row(0, &[collection.name.as_str(), "profile", dest.as_str()]);
        self.hooks.run_tasks("preProfile", &tasks.pre_profile, &context).await?;

        let mut registry = NameRegistry::new();
        let mut collected: Vec<Manifest> = Vec::new();
        for group in &collection.groups {
            let manifests = self
                .run_group(collection, group, full_build, &mut registry, summary)
                .await?;
            match collection.preamble {
                PreambleScope::Group => record_preamble(&group.dest, &manifests, summary)?,
                PreambleScope::Profile => collected.extend(manifests),
                PreambleScope::None => {}
            }
        }
        if collection.preamble == PreambleScope::Profile {
            record_preamble(&collection.dest, &collected, summary)?;
        }

        self.hooks.run_tasks("postProfile", &tasks.post_profile, &context).await?;
        if !registry.is_empty() {
            tracing::debug!("{} names registered in {}", registry.len(), collection.name);
        }
        Ok(())
    }

    /// Build the units of one group and return their manifests
    async fn run_group(
        &mut self,
        collection: &Collection,
        group: &Group,
        full_build: bool,
        registry: &mut NameRegistry,
        summary: &mut BuildSummary,
    ) -> Result<Vec<Manifest>> {
        let tasks = &collection.profile.tasks;
        let context = TaskContext {
            level: TaskLevel::Group,
            profile: collection.name.clone(),
            group: Some(group.name.clone()),
            unit: None,
            src: group.src.clone(),
            dest: group.dest.clone(),
        };

        self.reporter.row(1, &[group.name.as_str(), "group"]);
        self.hooks.run_tasks("preGroup", &tasks.pre_group, &context).await?;

        let assembler = Assembler::new(&self.toolchain, &self.hooks, full_build);
        let mut manifests = Vec::with_capacity(group.units.len());
        self.reporter.row(1, &[]);
        for builder in &group.units {
            let unit_context = TaskContext {
                level: TaskLevel::Unit,
                unit: Some(builder.name().to_string()),
                src: builder.src().to_path_buf(),
                dest: builder.dest().to_path_buf(),
                ..context.clone()
            };
            self.hooks.run_tasks("preUnit", &tasks.pre_unit, &unit_context).await?;

            let mut unit = builder.ensure(full_build)?;
            let outcome = assembler.build(&mut unit, registry).await?;
            report_unit(&mut self.reporter, builder.name(), &outcome);
            if outcome.skipped {
                summary.skipped += 1;
            } else {
                summary.built += 1;
            }
            manifests.push(unit.manifest);

            self.hooks.run_tasks("postUnit", &tasks.post_unit, &unit_context).await?;
            self.reporter.advance();
        }
        self.reporter.row(-2, &[]);

        self.hooks.run_tasks("postGroup", &tasks.post_group, &context).await?;
        Ok(manifests)
    }
}

fn record_preamble(dir: &Path, manifests: &[Manifest], summary: &mut BuildSummary) -> Result<()> {
    if let Some(path) = write_preamble(dir, manifests)? {
        summary.preambles.push(path);
    }
    Ok(())
}

fn report_unit(reporter: &mut Reporter, name: &str, outcome: &UnitOutcome) {
    let status = if outcome.skipped { "current" } else { "built" };
    let components = format!("{} components", outcome.components);
    let types = format!("{} types", outcome.types);
    let files = format!("{} resources, {} assets", outcome.resources, outcome.assets);
    reporter.row(0, &[name, status, components.as_str(), types.as_str(), files.as_str()]);
}
