//! @acp:module "Manifest Types"
//! @acp:summary "Unit manifest: the durable, serializable summary of a unit"
//! @acp:domain build
//! @acp:layer model
//!
//! These types serialize directly to/from `<unit>.cache.json`, are embedded
//! in the unit bundle and are aggregated into preamble files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crate::error::{Result, TesseraError};

/// @acp:summary "Unit manifest"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Unit name
    pub name: String,
    /// Canonical output path, relative to the shared destination root
    pub file: String,
    pub version: String,
    /// Last update timestamp
    pub lupdate: DateTime<Utc>,
    pub title: String,
    pub desc: String,
    pub copyright: String,
    pub license: String,
    /// Opaque identifier minted for every rebuild
    pub id: String,
    #[serde(default)]
    pub namespaces: Vec<NamespaceEntry>,
    /// Components and typed members
    #[serde(default)]
    pub types: Vec<TypeEntry>,
    /// Qualified names of embedded resources
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub assets: Vec<AssetEntry>,
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
}

impl Manifest {
    /// @acp:summary "Create a fresh manifest with a new id and the current time"
    pub fn new(name: &str, file: &str) -> Self {
        Self {
            name: name.to_string(),
            file: file.to_string(),
            version: String::new(),
            lupdate: Utc::now(),
            title: String::new(),
            desc: String::new(),
            copyright: String::new(),
            license: String::new(),
            id: uuid::Uuid::new_v4().to_string(),
            namespaces: Vec::new(),
            types: Vec::new(),
            resources: Vec::new(),
            assets: Vec::new(),
            routes: Vec::new(),
        }
    }

    /// @acp:summary "Load manifest from a cache file"
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let manifest = serde_json::from_reader(reader)?;
        Ok(manifest)
    }

    /// @acp:summary "Write manifest to a cache file"
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Compact JSON embedded in bundles and preambles
    pub fn to_compact_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Every qualified name this unit contributes to its domain
    pub fn qualified_names(&self) -> impl Iterator<Item = &str> {
        self.types
            .iter()
            .map(|t| t.name.as_str())
            .chain(self.resources.iter().map(String::as_str))
            .chain(self.routes.iter().map(|r| r.name.as_str()))
    }

    /// Count members of one kind, e.g. "component"
    pub fn count_kind(&self, kind: &str) -> usize {
        self.types.iter().filter(|t| t.kind == kind).count()
    }

    /// @acp:summary "Copy of this manifest without the per-build id and timestamp"
    ///
    /// Two builds of unchanged inputs produce equal stable views.
    pub fn stable_view(&self) -> Self {
        let mut view = self.clone();
        view.id = String::new();
        view.lupdate = DateTime::<Utc>::default();
        view
    }
}

/// @acp:summary "Namespace with its member count"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceEntry {
    pub name: String,
    pub members: usize,
}

/// @acp:summary "Component or typed member"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeEntry {
    /// Qualified name
    pub name: String,
    /// Detected kind: component, class, struct, mixin, interface, enum
    pub kind: String,
}

/// @acp:summary "Copied asset with its size"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetEntry {
    /// Path below the unit's files directory
    pub file: String,
    #[serde(rename = "type")]
    pub asset_type: String,
    /// Size in KB, two decimals
    pub size: f64,
}

impl AssetEntry {
    pub fn new(file: &str, asset_type: &str, bytes: u64) -> Self {
        Self {
            file: file.to_string(),
            asset_type: asset_type.to_string(),
            size: (bytes as f64 / 1024.0 * 100.0).round() / 100.0,
        }
    }
}

/// @acp:summary "Route declared in the unit's info sidecar"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub name: String,
    #[serde(default)]
    pub mount: String,
    pub path: String,
    #[serde(default)]
    pub handler: String,
    #[serde(default)]
    pub verbs: Vec<String>,
    #[serde(default, rename = "mw")]
    pub middleware: Vec<String>,
    #[serde(default)]
    pub index: i32,
}

/// @acp:summary "Domain-wide registry of qualified names"
///
/// One registry covers one collection for one run.
#[derive(Debug, Default)]
pub struct NameRegistry {
    owners: HashMap<String, PathBuf>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name` as owned by `origin`; a second owner is a violation
    pub fn register(&mut self, name: &str, origin: &Path) -> Result<()> {
        if let Some(existing) = self.owners.get(name) {
            return Err(TesseraError::naming(
                origin,
                format!(
                    "qualified name '{}' is already defined by {}",
                    name,
                    existing.display()
                ),
            ));
        }
        self.owners.insert(name.to_string(), origin.to_path_buf());
        Ok(())
    }

    /// Register every qualified name of a manifest
    pub fn register_manifest(&mut self, manifest: &Manifest, origin: &Path) -> Result<()> {
        for name in manifest.qualified_names() {
            self.register(name, origin)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample() -> Manifest {
        let mut manifest = Manifest::new("shell", "./app/shell.js");
        manifest.types.push(TypeEntry {
            name: "ui.Button".to_string(),
            kind: "class".to_string(),
        });
        manifest.resources.push("banner".to_string());
        manifest.routes.push(RouteEntry {
            name: "home".to_string(),
            mount: "main".to_string(),
            path: "/".to_string(),
            handler: "HomeHandler".to_string(),
            verbs: vec!["get".to_string()],
            middleware: vec![],
            index: 0,
        });
        manifest
    }

    #[test]
    fn test_manifest_cache_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shell.cache.json");
        let manifest = sample();

        manifest.write_json(&path).unwrap();
        let loaded = Manifest::from_json(&path).unwrap();

        assert_eq!(loaded, manifest);
    }

    #[test]
    fn test_fresh_manifests_get_distinct_ids() {
        let a = Manifest::new("a", "./a.js");
        let b = Manifest::new("a", "./a.js");
        assert_ne!(a.id, b.id);
        assert_eq!(a.stable_view(), b.stable_view());
    }

    #[test]
    fn test_asset_size_in_kb() {
        assert_eq!(AssetEntry::new("a.png", "png", 2048).size, 2.0);
        assert_eq!(AssetEntry::new("b.png", "png", 1000).size, 0.98);
    }

    #[test]
    fn test_registry_rejects_duplicates_across_kinds() {
        let mut registry = NameRegistry::new();
        registry
            .register_manifest(&sample(), Path::new("app/shell"))
            .unwrap();
        assert_eq!(registry.len(), 3);

        let err = registry.register("banner", Path::new("app/other")).unwrap_err();
        assert!(matches!(err, TesseraError::NamingViolation { .. }));
    }

    #[test]
    fn test_route_middleware_key() {
        let json = serde_json::to_value(&sample().routes[0]).unwrap();
        assert_eq!(json["mw"], serde_json::json!([]));
    }
}
