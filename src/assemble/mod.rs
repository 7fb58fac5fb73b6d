//! @acp:module "Unit Assembler"
//! @acp:summary "Fixed-order stages that turn a classified unit into its bundle"
//! @acp:domain build
//! @acp:layer service
//!
//! # Stages
//!
//! 1. **Template seed**: custom `index.js` or the default template, manifest
//!    tokens plus the `settings`/`config` JSON sidecars
//! 2. **Includes**, 3. **Globals**, 4. **Components**, 5. **Resources**,
//!    6. **Types**: each fills its template slot
//! 7. **Assets**: copied into the unit's files folder
//! 8. **Manifest embed**
//!
//! Post-processing then writes the bundle, runs the unit hooks and finally
//! persists the manifest cache, so a failed hook leaves no cache behind and
//! the next run rebuilds the unit.

pub mod assets;
pub mod inject;
pub mod members;
pub mod post;
pub mod region;
pub mod resources;
pub mod template;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::cache::{Manifest, NameRegistry, NamespaceEntry};
use crate::config::Profile;
use crate::error::{Result, TesseraError};
use crate::hooks::HookRunner;
use crate::scan::{SourceFile, Wildcards};
use crate::tools::Toolchain;
use crate::unit::Unit;

pub use post::Artifacts;
pub use template::{Template, DEFAULT_TEMPLATE};

use members::{Scope, COMPONENT_KINDS, TYPE_KINDS};

/// @acp:summary "Per-file tool gates: capability × extension allow-list × exclusion"
#[derive(Debug)]
pub struct Gates {
    profile: Arc<Profile>,
    lint: Wildcards,
    minify: Wildcards,
    gzip: Wildcards,
    inject: Wildcards,
    scramble: Wildcards,
}

impl Gates {
    pub fn new(profile: &Arc<Profile>) -> Result<Self> {
        Ok(Self {
            profile: profile.clone(),
            lint: Wildcards::new(&profile.exclude.lint)?,
            minify: Wildcards::new(&profile.exclude.minify)?,
            gzip: Wildcards::new(&profile.exclude.gzip)?,
            inject: Wildcards::new(&profile.exclude.inject)?,
            scramble: Wildcards::new(&profile.scramble)?,
        })
    }

    /// `key` is a relative path or a unit name
    pub fn lint(&self, ext: &str, key: &str) -> bool {
        self.profile.lint && self.profile.lint_types.iter().any(|t| t == ext) && !self.lint.matches_path(key)
    }

    pub fn minify(&self, ext: &str, key: &str) -> bool {
        self.profile.minify
            && self.profile.minify_types.iter().any(|t| t == ext)
            && !self.minify.matches_path(key)
    }

    pub fn gzip(&self, ext: &str, key: &str) -> bool {
        self.profile.gzip && self.profile.gzip_types.iter().any(|t| t == ext) && !self.gzip.matches_path(key)
    }

    /// Members whose qualified name is not excluded get metadata lines
    pub fn inject(&self, qualified_name: &str) -> bool {
        !self.inject.matches(qualified_name)
    }

    pub fn scramble(&self, unit_name: &str) -> bool {
        self.scramble.matches(unit_name)
    }
}

/// @acp:summary "What one unit build did, for progress output"
#[derive(Debug, Clone, PartialEq)]
pub struct UnitOutcome {
    pub skipped: bool,
    pub components: usize,
    pub types: usize,
    pub resources: usize,
    pub assets: usize,
    pub routes: usize,
    pub artifacts: Option<Artifacts>,
}

impl UnitOutcome {
    fn from_manifest(manifest: &Manifest, artifacts: Option<Artifacts>) -> Self {
        let components = manifest.count_kind("component");
        Self {
            skipped: artifacts.is_none(),
            components,
            types: manifest.types.len() - components,
            resources: manifest.resources.len(),
            assets: manifest.assets.len(),
            routes: manifest.routes.len(),
            artifacts,
        }
    }
}

/// @acp:summary "Builds units with a shared toolchain and hook runner"
pub struct Assembler<'a> {
    toolchain: &'a Toolchain,
    hooks: &'a HookRunner,
    full_build: bool,
}

impl<'a> Assembler<'a> {
    pub fn new(toolchain: &'a Toolchain, hooks: &'a HookRunner, full_build: bool) -> Self {
        Self {
            toolchain,
            hooks,
            full_build,
        }
    }

    /// @acp:summary "Build one unit, or register its cached manifest when current"
    pub async fn build(&self, unit: &mut Unit, registry: &mut NameRegistry) -> Result<UnitOutcome> {
        if unit.skip_build() {
            tracing::info!("Unit {} is up to date", unit.name);
            registry.register_manifest(&unit.manifest, &unit.src)?;
            return Ok(UnitOutcome::from_manifest(&unit.manifest, None));
        }

        tracing::info!("Building unit {}", unit.name);
        let gates = Gates::new(&unit.profile)?;
        let toolchain = self.toolchain;

        // 1. Template seed
        let template = load_template(unit)?;
        let mut slots = seed_slots(unit)?;

        // 2-3. Includes and globals
        slots.insert("includes", members::includes(unit)?);
        slots.insert("globals", members::globals(unit, toolchain, &gates)?);

        // 4. Components
        let (components, entries) = members::definitions(
            unit,
            &unit.categories.components,
            COMPONENT_KINDS,
            Scope::Shared,
            toolchain,
            &gates,
        )?;
        slots.insert("components", components);
        unit.manifest.types.extend(entries);

        // 5. Resources
        let (resources, names) = resources::embed(unit, toolchain, &gates)?;
        slots.insert("resources", resources);
        unit.manifest.resources = names;

        // 6. Types
        let scope = Scope::Isolated {
            asynchronous: unit.profile.async_types,
        };
        let (types, entries) =
            members::definitions(unit, &unit.categories.types, TYPE_KINDS, scope, toolchain, &gates)?;
        slots.insert("types", types);
        unit.manifest.types.extend(entries);
        unit.manifest.namespaces = namespaces(&unit.categories.types);

        registry.register_manifest(&unit.manifest, &unit.src)?;

        // 7. Assets
        unit.manifest.assets = assets::copy_assets(unit, toolchain, &gates, self.full_build)?;

        // 8. Manifest embed
        slots.insert("manifest", unit.manifest.to_compact_json()?);

        let artifacts = post::finish(unit, &template.render(&slots), toolchain, &gates)?;

        self.hooks.docs_build(unit).await?;
        self.hooks.tests_build(unit).await?;

        unit.manifest.write_json(&unit.paths.cache_file)?;
        Ok(UnitOutcome::from_manifest(&unit.manifest, Some(artifacts)))
    }
}

fn load_template(unit: &Unit) -> Result<Template> {
    let custom = unit.src.join(&unit.conventions.template);
    if custom.is_file() {
        tracing::debug!("Using custom template {}", custom.display());
        let template = Template::parse(&std::fs::read_to_string(&custom)?);
        if !template.has_slot("manifest") {
            tracing::warn!("{} has no <<manifest>> slot", custom.display());
        }
        return Ok(template);
    }
    Ok(Template::parse(DEFAULT_TEMPLATE))
}

/// Manifest tokens plus the settings/config sidecars
fn seed_slots(unit: &Unit) -> Result<HashMap<&'static str, String>> {
    let manifest = &unit.manifest;
    Ok(HashMap::from([
        ("name", manifest.name.clone()),
        ("file", manifest.file.clone()),
        ("version", manifest.version.clone()),
        ("lupdate", manifest.lupdate.to_rfc3339()),
        ("title", manifest.title.clone()),
        ("desc", manifest.desc.clone()),
        ("copyright", manifest.copyright.clone()),
        ("license", manifest.license.clone()),
        ("id", manifest.id.clone()),
        (
            "unit",
            serde_json::json!({ "name": manifest.name, "file": manifest.file, "id": manifest.id })
                .to_string(),
        ),
        ("settings", json_sidecar(&unit.src.join(&unit.conventions.settings))?),
        ("config", json_sidecar(&unit.src.join(&unit.conventions.config))?),
    ]))
}

/// Compact JSON of an optional sidecar, `{}` when absent
fn json_sidecar(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Ok("{}".to_string());
    }
    let content = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| TesseraError::processing(path, format!("invalid JSON: {}", e)))?;
    Ok(value.to_string())
}

/// Namespaces in first-seen order with their member counts
fn namespaces(types: &[SourceFile]) -> Vec<NamespaceEntry> {
    let mut entries: Vec<NamespaceEntry> = Vec::new();
    for ns in types.iter().filter_map(|f| f.namespace.as_ref()) {
        match entries.iter_mut().find(|e| e.name == ns.name) {
            Some(entry) => entry.members += 1,
            None => entries.push(NamespaceEntry {
                name: ns.name.clone(),
                members: 1,
            }),
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Profile;

    fn gates(profile: Profile) -> Gates {
        Gates::new(&Arc::new(profile)).unwrap()
    }

    #[test]
    fn test_gates_combine_capability_type_and_exclusion() {
        let mut profile = Profile::named("default");
        profile.minify = true;
        profile.exclude.minify = vec!["*.min.js".to_string(), "vendor".to_string()];
        let gates = gates(profile);

        assert!(gates.minify("js", "app.js"));
        assert!(!gates.minify("js", "lib/app.min.js"));
        assert!(!gates.minify("js", "vendor"));
        assert!(!gates.minify("png", "logo.png"));
        assert!(!gates.gzip("js", "app.js"));
        assert!(gates.lint("json", "data.json"));
    }

    #[test]
    fn test_inject_and_scramble_wildcards() {
        let mut profile = Profile::named("default");
        profile.exclude.inject = vec!["internal.*".to_string()];
        profile.scramble = vec!["secure*".to_string()];
        let gates = gates(profile);

        assert!(gates.inject("ui.Button"));
        assert!(!gates.inject("internal.Helper"));
        assert!(gates.scramble("secure-core"));
        assert!(!gates.scramble("shell"));
    }
}
