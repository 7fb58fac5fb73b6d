//! @acp:module "Profile Loader"
//! @acp:summary "Materialize collections, groups and lazy unit builders from the config"
//! @acp:domain build
//! @acp:layer service
//!
//! # Plan loading
//!
//! 1. Merge every profile over the `default` profile and deserialize it
//! 2. Resolve `src`/`dest` tokens in declaration order, so aliases only see
//!    profiles declared earlier
//! 3. Keep the selected profiles as collections
//! 4. Discover groups, then the units of each group
//!
//! Units are registered as [`UnitBuilder`]s. Nothing below the unit folder
//! is read until the orchestrator calls [`UnitBuilder::ensure`].

pub mod resolve;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use crate::config::{merge_values, Config, Conventions, PackageInfo, PreambleScope, Profile, DEFAULT_PROFILE};
use crate::error::{Result, TesseraError};
use crate::preamble::PREAMBLE_FILE;
use crate::scan::{Classifier, Wildcards};
use crate::unit::{self, Unit, UnitContext, UnitPaths};

use resolve::{ResolvedRoots, RootKind};

/// Conventional group folder used when no groups are configured
pub const APP_GROUP: &str = "app";

/// Group rooted at the collection itself
pub const DEFAULT_GROUP: &str = "default";

/// @acp:summary "The whole build plan"
#[derive(Debug)]
pub struct BuildPlan {
    pub src_root: PathBuf,
    pub dest_root: PathBuf,
    pub collections: Vec<Collection>,
}

impl BuildPlan {
    pub fn unit_count(&self) -> usize {
        self.collections
            .iter()
            .flat_map(|c| &c.groups)
            .map(|g| g.units.len())
            .sum()
    }
}

/// @acp:summary "One profile with its resolved roots and groups"
#[derive(Debug)]
pub struct Collection {
    pub name: String,
    pub profile: Arc<Profile>,
    pub src: PathBuf,
    pub dest: PathBuf,
    pub preamble: PreambleScope,
    pub groups: Vec<Group>,
}

#[derive(Debug)]
pub struct Group {
    pub name: String,
    pub src: PathBuf,
    pub dest: PathBuf,
    pub units: Vec<UnitBuilder>,
}

/// @acp:summary "Deferred unit construction"
#[derive(Debug, Clone)]
pub struct UnitBuilder {
    name: String,
    group: String,
    src: PathBuf,
    dest: PathBuf,
    dest_root: PathBuf,
    profile: Arc<Profile>,
    conventions: Arc<Conventions>,
    package: Arc<PackageInfo>,
}

impl UnitBuilder {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn src(&self) -> &Path {
        &self.src
    }

    pub fn dest(&self) -> &Path {
        &self.dest
    }

    /// @acp:summary "Classify the unit and decide whether it needs a rebuild"
    pub fn ensure(&self, full_build: bool) -> Result<Unit> {
        let classifier = Classifier::new(&self.profile.exclude.files)?
            .with_namespace_root(self.conventions.types.clone());
        let paths = UnitPaths::new(&self.dest, &self.name, &self.conventions.script_ext);
        let decision = unit::decide(&self.src, &paths, full_build, &classifier)?;

        if decision.skip() {
            tracing::debug!("Unit {} is current", self.name);
        }

        Unit::new(
            UnitContext {
                name: &self.name,
                group: &self.group,
                src: &self.src,
                dest: &self.dest,
                dest_root: &self.dest_root,
                profile: self.profile.clone(),
                conventions: self.conventions.clone(),
                package: &self.package,
            },
            decision,
        )
    }
}

/// @acp:summary "Load the build plan for the selected profiles"
///
/// An empty selection selects every declared profile.
pub fn load_plan(config: &Config, root: &Path, selected: &[String]) -> Result<BuildPlan> {
    let src_root = root.join(&config.src);
    let dest_root = root.join(&config.dest);
    let conventions = Arc::new(config.conventions.clone());
    let package = Arc::new(config.package.clone());

    let profiles = resolve_profiles(&config.profiles)?;

    for name in selected {
        if !profiles.iter().any(|p| &p.name == name) {
            return Err(TesseraError::Configuration(format!(
                "unknown profile '{}'",
                name
            )));
        }
    }

    let mut roots = ResolvedRoots::default();
    let mut collections = Vec::new();
    for profile in profiles {
        let src = roots.resolve(&profile.src, &src_root, &profile.name, RootKind::Src)?;
        let dest = roots.resolve(&profile.dest, &dest_root, &profile.name, RootKind::Dest)?;
        roots.insert(&profile.name, src.clone(), dest.clone());

        if !selected.is_empty() && !selected.contains(&profile.name) {
            continue;
        }

        let profile = Arc::new(profile);
        let mut groups = Vec::new();
        for (name, group_src, group_dest) in discover_groups(&profile, &src, &dest) {
            let units = discover_units(&profile, &conventions, &src, &group_src)?
                .into_iter()
                .map(|unit_name| UnitBuilder {
                    src: group_src.join(&unit_name),
                    dest: group_dest.clone(),
                    name: unit_name,
                    group: name.clone(),
                    dest_root: dest_root.clone(),
                    profile: profile.clone(),
                    conventions: conventions.clone(),
                    package: package.clone(),
                })
                .collect();
            groups.push(Group {
                name,
                src: group_src,
                dest: group_dest,
                units,
            });
        }

        tracing::debug!(
            "Collection {}: {} groups from {}",
            profile.name,
            groups.len(),
            src.display()
        );
        collections.push(Collection {
            name: profile.name.clone(),
            preamble: profile.preamble,
            profile,
            src,
            dest,
            groups,
        });
    }

    if !selected.is_empty() {
        collections.sort_by_key(|c| selected.iter().position(|s| s == &c.name));
    }

    Ok(BuildPlan {
        src_root,
        dest_root,
        collections,
    })
}

/// Merge each declaration over `default` and deserialize, keeping order
fn resolve_profiles(declared: &[Value]) -> Result<Vec<Profile>> {
    let default = declared
        .iter()
        .find(|p| p.get("name").and_then(Value::as_str) == Some(DEFAULT_PROFILE))
        .cloned()
        .unwrap_or_else(|| Value::Object(Default::default()));

    let mut profiles: Vec<Profile> = Vec::with_capacity(declared.len());
    for raw in declared {
        let name = raw
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| TesseraError::Configuration("profile without a name".to_string()))?
            .to_string();
        if profiles.iter().any(|p| p.name == name) {
            return Err(TesseraError::Configuration(format!(
                "profile '{}' is declared twice",
                name
            )));
        }

        let merged = if name == DEFAULT_PROFILE {
            raw.clone()
        } else {
            merge_values(default.clone(), raw.clone())
        };
        let profile: Profile = serde_json::from_value(merged).map_err(|e| {
            TesseraError::Configuration(format!("profile '{}': {}", name, e))
        })?;
        profiles.push(profile);
    }
    Ok(profiles)
}

/// Explicit groups, else the `app` folder, else the collection root itself
fn discover_groups(profile: &Profile, src: &Path, dest: &Path) -> Vec<(String, PathBuf, PathBuf)> {
    if !profile.groups.is_empty() {
        return profile
            .groups
            .iter()
            .map(|g| (g.clone(), src.join(g), dest.join(g)))
            .collect();
    }
    if src.join(APP_GROUP).is_dir() {
        return vec![(APP_GROUP.to_string(), src.join(APP_GROUP), dest.join(APP_GROUP))];
    }
    vec![(DEFAULT_GROUP.to_string(), src.to_path_buf(), dest.to_path_buf())]
}

/// First-level folders of the group root, in name order
fn discover_units(
    profile: &Profile,
    conventions: &Conventions,
    collection_src: &Path,
    group_src: &Path,
) -> Result<Vec<String>> {
    if !group_src.is_dir() {
        tracing::warn!("Group folder {} does not exist", group_src.display());
        return Ok(Vec::new());
    }
    let skip = Wildcards::new(&profile.skip_units)?;
    let at_collection_root = group_src == collection_src;

    let mut names = Vec::new();
    for entry in std::fs::read_dir(group_src)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.')
            || (at_collection_root && profile.special_folders.contains(&name))
            || skip.matches(&name)
        {
            continue;
        }
        if profile.preamble != PreambleScope::None
            && format!("{}.{}", name, conventions.script_ext) == PREAMBLE_FILE
        {
            return Err(TesseraError::Configuration(format!(
                "unit '{}' in {} would be overwritten by {}",
                name,
                group_src.display(),
                PREAMBLE_FILE
            )));
        }
        names.push(name);
    }
    names.sort();
    Ok(names)
}
