//! @acp:module "Build Unit"
//! @acp:summary "A unit's paths, categorized sources, sidecar info and manifest"
//! @acp:domain build
//! @acp:layer model
//!
//! A unit is created by its plan builder right before it builds and is
//! dropped once its artifacts are written. The skip flag is decided at
//! construction and can only be cleared afterwards.

pub mod incremental;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::cache::{Manifest, RouteEntry};
use crate::config::{Conventions, PackageInfo, Profile};
use crate::error::{Result, TesseraError};
use crate::scan::SourceFile;

pub use incremental::{decide, Decision};

/// @acp:summary "Destination paths of one unit"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitPaths {
    /// `<dest>/<name>.<ext>`
    pub main: PathBuf,
    /// `<dest>/<name>.min.<ext>`
    pub minified: PathBuf,
    /// `<dest>/<name>/`
    pub files_dir: PathBuf,
    /// `<dest>/<name>.cache.json`
    pub cache_file: PathBuf,
}

impl UnitPaths {
    pub fn new(dest: &Path, name: &str, ext: &str) -> Self {
        Self {
            main: dest.join(format!("{}.{}", name, ext)),
            minified: dest.join(format!("{}.min.{}", name, ext)),
            files_dir: dest.join(name),
            cache_file: dest.join(format!("{}.cache.json", name)),
        }
    }
}

/// @acp:summary "Classified files partitioned by category folder"
#[derive(Debug, Default)]
pub struct Categories {
    pub includes: Vec<SourceFile>,
    pub globals: Vec<SourceFile>,
    pub components: Vec<SourceFile>,
    pub types: Vec<SourceFile>,
    pub resources: Vec<SourceFile>,
    pub assets: Vec<SourceFile>,
    pub libs: Vec<SourceFile>,
    /// `(@)` files inside a types namespace
    pub inplace_assets: Vec<SourceFile>,
    /// `($)` files inside a types namespace
    pub localized: Vec<SourceFile>,
}

impl Categories {
    /// @acp:summary "Route each file to its category by top folder and markers"
    pub fn partition(files: Vec<SourceFile>, conventions: &Conventions) -> Self {
        let mut categories = Self::default();
        for file in files {
            let Some(top) = file.top_folder() else {
                // Sidecars and the custom template live in the unit root
                continue;
            };
            let target = if top == conventions.includes {
                &mut categories.includes
            } else if top == conventions.globals {
                &mut categories.globals
            } else if top == conventions.components {
                &mut categories.components
            } else if top == conventions.types {
                if file.is_asset {
                    &mut categories.inplace_assets
                } else if file.is_localized {
                    &mut categories.localized
                } else {
                    &mut categories.types
                }
            } else if top == conventions.resources {
                &mut categories.resources
            } else if top == conventions.assets {
                &mut categories.assets
            } else if top == conventions.libs {
                &mut categories.libs
            } else {
                // (locales) replicas are looked up on demand, (docs)/(tests) feed hooks
                continue;
            };
            target.push(file);
        }
        categories
    }

    /// @acp:summary "Enforce dot-free base names and per-category uniqueness"
    pub fn validate(&self, script_ext: &str) -> Result<()> {
        check_members(&self.globals, |f| f.name.clone())?;
        check_members(&self.components, |f| f.name.clone())?;
        check_members(&self.types, SourceFile::qualified_name)?;
        check_members(&self.resources, |f| f.name.clone())?;

        for file in self.globals.iter().chain(&self.components).chain(&self.types) {
            if file.ext != script_ext {
                return Err(TesseraError::naming(
                    &file.path,
                    format!("member files must have the .{} extension", script_ext),
                ));
            }
        }
        Ok(())
    }
}

fn check_members(files: &[SourceFile], key: impl Fn(&SourceFile) -> String) -> Result<()> {
    let mut seen = HashSet::new();
    for file in files {
        if file.name.contains('.') {
            return Err(TesseraError::naming(
                &file.path,
                format!("base name '{}' contains '.'", file.name),
            ));
        }
        let key = key(file);
        if !seen.insert(key.clone()) {
            return Err(TesseraError::naming(
                &file.path,
                format!("duplicate member name '{}'", key),
            ));
        }
    }
    Ok(())
}

/// @acp:summary "Contents of the optional info sidecar"
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UnitInfo {
    pub title: String,
    pub description: String,
    pub routes: Vec<RouteEntry>,
    /// Resource base name → description
    pub resources: HashMap<String, String>,
}

impl UnitInfo {
    /// Read the sidecar when it exists
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// @acp:summary "One buildable unit"
#[derive(Debug)]
pub struct Unit {
    pub name: String,
    /// Group the unit belongs to
    pub group: String,
    pub src: PathBuf,
    pub dest: PathBuf,
    pub paths: UnitPaths,
    pub categories: Categories,
    pub info: UnitInfo,
    pub manifest: Manifest,
    pub profile: Arc<Profile>,
    pub conventions: Arc<Conventions>,
    skip: bool,
}

/// Everything needed to create a [`Unit`]
pub struct UnitContext<'a> {
    pub name: &'a str,
    pub group: &'a str,
    pub src: &'a Path,
    pub dest: &'a Path,
    /// Shared destination root; manifest paths are relative to it
    pub dest_root: &'a Path,
    pub profile: Arc<Profile>,
    pub conventions: Arc<Conventions>,
    pub package: &'a PackageInfo,
}

impl Unit {
    /// @acp:summary "Create a unit from its incremental decision"
    ///
    /// A cached manifest is adopted as-is and marks the unit as current.
    /// Otherwise a fresh manifest is minted and the categories are validated.
    pub fn new(context: UnitContext<'_>, decision: Decision) -> Result<Self> {
        let paths = UnitPaths::new(context.dest, context.name, &context.conventions.script_ext);
        let categories = Categories::partition(
            decision.classification.files,
            &context.conventions,
        );
        let info = UnitInfo::load(&context.src.join(&context.conventions.info))?;

        let skip = decision.cached.is_some();
        let manifest = match decision.cached {
            Some(manifest) => manifest,
            None => {
                categories.validate(&context.conventions.script_ext)?;
                let file = format!(
                    "./{}",
                    crate::scan::relative_path(context.dest_root, &paths.main)
                );
                let mut manifest = Manifest::new(context.name, &file);
                manifest.version = context.package.version.clone();
                manifest.copyright = context.package.copyright.clone();
                manifest.license = context.package.license.clone();
                manifest.title = info.title.clone();
                manifest.desc = info.description.clone();
                manifest.routes = info.routes.clone();
                manifest.routes.sort_by_key(|r| r.index);
                manifest
            }
        };

        Ok(Self {
            name: context.name.to_string(),
            group: context.group.to_string(),
            src: context.src.to_path_buf(),
            dest: context.dest.to_path_buf(),
            paths,
            categories,
            info,
            manifest,
            profile: context.profile,
            conventions: context.conventions,
            skip,
        })
    }

    /// True when the previous output is still valid
    pub fn skip_build(&self) -> bool {
        self.skip
    }

    /// The unit's `(docs)` source folder
    pub fn docs_dir(&self) -> PathBuf {
        self.src.join(&self.conventions.docs)
    }

    /// The unit's `(tests)` source folder
    pub fn tests_dir(&self) -> PathBuf {
        self.src.join(&self.conventions.tests)
    }
}
