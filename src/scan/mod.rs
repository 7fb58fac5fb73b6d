//! @acp:module "File Classifier"
//! @acp:summary "Single-pass walk of a unit's sources with marker decoding"
//! @acp:domain build
//! @acp:layer service
//!
//! # Classification
//!
//! 1. **Walk** the unit root in file-name order, skipping junk files
//! 2. **Prune** any folder whose name matches an exclusion wildcard, once per
//!    folder, so nothing below it is visited
//! 3. **Drop** files whose relative path or file name matches a wildcard
//! 4. **Decode** filename markers and the namespace folder
//! 5. **Sort** by explicit index, then base name
//!
//! The walk also answers the incremental question: `changed` turns true as
//! soon as one file is strictly newer than the supplied watermark.

pub mod marker;
pub mod wildcard;

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use walkdir::{DirEntry, WalkDir};

use crate::error::{Result, TesseraError};

pub use marker::Marker;
pub use wildcard::Wildcards;

/// File names produced by operating systems and editors
const JUNK_FILES: &[&str] = &[".DS_Store", "Thumbs.db", "desktop.ini", ".gitkeep"];

/// Folder names produced by version control and editors
const JUNK_FOLDERS: &[&str] = &[".git", ".svn", ".hg", ".idea", ".vscode", "__MACOSX"];

fn is_junk_file(name: &str) -> bool {
    JUNK_FILES.contains(&name)
        || name.ends_with('~')
        || name.ends_with(".swp")
        || name.ends_with(".swo")
}

/// @acp:summary "Namespace of a file below the types root"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    pub name: String,
    /// Namespace folder relative to the unit root
    pub path: String,
}

/// @acp:summary "Classified source file descriptor"
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Absolute parent folder
    pub folder: PathBuf,
    /// Absolute raw path
    pub path: PathBuf,
    /// Raw path relative to the unit root, `/` separated
    pub rel: String,
    /// Marker-stripped absolute path
    pub canonical: PathBuf,
    /// Marker-stripped relative path
    pub canonical_rel: String,
    /// Base name without extension
    pub name: String,
    /// Lowercase extension without the dot
    pub ext: String,
    pub index: i64,
    pub is_asset: bool,
    pub is_localized: bool,
    pub namespace: Option<Namespace>,
    pub modified: SystemTime,
}

impl SourceFile {
    pub fn is_namespaced(&self) -> bool {
        self.namespace.is_some()
    }

    /// First folder of the relative path, `None` for files in the unit root
    pub fn top_folder(&self) -> Option<&str> {
        self.rel.split_once('/').map(|(top, _)| top)
    }

    /// `<namespace>.<name>` or the bare name
    pub fn qualified_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}.{}", ns.name, self.name),
            None => self.name.clone(),
        }
    }

    /// Canonical path relative to `folder` (a top folder such as `(assets)`)
    pub fn rel_below(&self, folder: &str) -> &str {
        self.canonical_rel
            .strip_prefix(folder)
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(&self.canonical_rel)
    }
}

/// @acp:summary "Result of one classification walk"
#[derive(Debug, Default)]
pub struct Classification {
    pub files: Vec<SourceFile>,
    pub changed: bool,
}

/// @acp:summary "Walks a unit root and decodes its naming conventions"
#[derive(Debug, Clone)]
pub struct Classifier {
    excludes: Wildcards,
    namespace_root: Option<String>,
}

impl Classifier {
    pub fn new<S: AsRef<str>>(excludes: &[S]) -> Result<Self> {
        Ok(Self {
            excludes: Wildcards::new(excludes)?,
            namespace_root: None,
        })
    }

    /// Folder (relative to the unit root) whose first sub-folder names the namespace
    pub fn with_namespace_root(mut self, root: impl Into<String>) -> Self {
        self.namespace_root = Some(root.into());
        self
    }

    /// @acp:summary "Enumerate, filter, decode and sort the files under `root`"
    pub fn classify(&self, root: &Path, changed_since: Option<SystemTime>) -> Result<Classification> {
        let mut result = Classification::default();
        if !root.is_dir() {
            return Ok(result);
        }

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| self.keep_folder(entry));

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy().to_string();
            if is_junk_file(&file_name) {
                continue;
            }

            let rel = relative_path(root, entry.path());
            if self.is_excluded(&rel, &file_name) {
                tracing::debug!("Excluded {}", rel);
                continue;
            }

            let modified = entry.metadata()?.modified()?;
            if let Some(watermark) = changed_since {
                if !result.changed && modified > watermark {
                    tracing::debug!("{} is newer than the previous output", rel);
                    result.changed = true;
                }
            }

            result.files.push(self.describe(entry.path(), rel, &file_name, modified)?);
        }

        // Stable: equal keys keep walk order
        result
            .files
            .sort_by(|a, b| a.index.cmp(&b.index).then_with(|| a.name.cmp(&b.name)));

        tracing::debug!(
            "Classified {} files under {}",
            result.files.len(),
            root.display()
        );
        Ok(result)
    }

    /// Folder-level exclusion, evaluated once per folder by the walker
    /// File-level exclusion by relative path or bare file name
    fn is_excluded(&self, rel: &str, file_name: &str) -> bool {
        !self.excludes.is_empty() && (self.excludes.matches(rel) || self.excludes.matches(file_name))
    }

    fn keep_folder(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }
        let name = entry.file_name().to_string_lossy();
        !(JUNK_FOLDERS.contains(&name.as_ref()) || self.excludes.matches(&name))
    }

    fn describe(&self, path: &Path, rel: String, file_name: &str, modified: SystemTime) -> Result<SourceFile> {
        let namespace = self.namespace_of(&rel);
        let marker = marker::decode(file_name, namespace.is_some())
            .map_err(|message| TesseraError::naming(path, message))?;

        let folder = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let canonical = folder.join(&marker.canonical);
        let canonical_rel = match rel.rsplit_once('/') {
            Some((parent, _)) => format!("{}/{}", parent, marker.canonical),
            None => marker.canonical.clone(),
        };
        let (name, ext) = split_name(&marker.canonical);

        Ok(SourceFile {
            folder,
            path: path.to_path_buf(),
            rel,
            canonical,
            canonical_rel,
            name,
            ext,
            index: marker.index,
            is_asset: marker.asset,
            is_localized: marker.localized,
            namespace,
            modified,
        })
    }

    fn namespace_of(&self, rel: &str) -> Option<Namespace> {
        let root = self.namespace_root.as_deref()?;
        let mut segments = rel.split('/');
        if segments.next()? != root {
            return None;
        }
        let name = segments.next()?;
        // A file directly in the root has nothing after its own name
        segments.next()?;
        Some(Namespace {
            name: name.to_string(),
            path: format!("{}/{}", root, name),
        })
    }
}

/// Split `a.b.ext` into (`a.b`, `ext`); dot files keep their full name
fn split_name(file_name: &str) -> (String, String) {
    match file_name.rfind('.') {
        Some(pos) if pos > 0 => (
            file_name[..pos].to_string(),
            file_name[pos + 1..].to_ascii_lowercase(),
        ),
        _ => (file_name.to_string(), String::new()),
    }
}

/// Path of `path` below `root` with `/` separators
pub fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
