//! @acp:module "Toolchain"
//! @acp:summary "Lint, minify and compress seams with built-in and command-backed implementations"
//! @acp:domain build
//! @acp:layer service
//!
//! Each collaborator is a trait object so a build can swap the built-in
//! in-process implementation for an external command per file kind, or for
//! a test double.

pub mod builtin;
pub mod command;
pub mod gzip;

use std::path::{Path, PathBuf};

use crate::config::ToolsConfig;
use crate::error::{Result, TesseraError};

pub use builtin::{BuiltinLinter, BuiltinMinifier};
pub use command::{CommandLinter, CommandMinifier};
pub use gzip::GzipCompressor;

/// @acp:summary "Checks one file of a given kind"
pub trait Linter: Send + Sync {
    /// Returns the lint report, `None` when the file is clean
    fn lint(&self, kind: &str, file: &Path) -> Result<Option<String>>;
}

/// Minifier output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Minified {
    pub code: String,
    /// Source map, when the minifier produces one
    pub map: Option<String>,
}

/// @acp:summary "Shrinks source text of a given kind"
pub trait Minifier: Send + Sync {
    /// `file` names the source on disk for tools that need a path
    fn minify(&self, kind: &str, source: &str, file: &Path) -> Result<Minified>;
}

/// @acp:summary "Writes a compressed copy of a file"
pub trait Compressor: Send + Sync {
    fn compress(&self, src: &Path, dest: &Path) -> Result<()>;
}

/// @acp:summary "The three build collaborators behind one handle"
pub struct Toolchain {
    linter: Box<dyn Linter>,
    minifier: Box<dyn Minifier>,
    compressor: Box<dyn Compressor>,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Toolchain {
    /// In-process implementations only
    pub fn builtin() -> Self {
        Self {
            linter: Box::new(BuiltinLinter),
            minifier: Box::new(BuiltinMinifier),
            compressor: Box::new(GzipCompressor::default()),
        }
    }

    /// External commands for the configured kinds, built-ins for the rest
    pub fn from_config(tools: &ToolsConfig) -> Self {
        let mut toolchain = Self::builtin();
        if !tools.lint.is_empty() {
            toolchain.linter = Box::new(CommandLinter::new(tools.lint.clone(), BuiltinLinter));
        }
        if !tools.minify.is_empty() {
            toolchain.minifier =
                Box::new(CommandMinifier::new(tools.minify.clone(), BuiltinMinifier));
        }
        toolchain
    }

    pub fn with_linter(mut self, linter: impl Linter + 'static) -> Self {
        self.linter = Box::new(linter);
        self
    }

    pub fn with_minifier(mut self, minifier: impl Minifier + 'static) -> Self {
        self.minifier = Box::new(minifier);
        self
    }

    pub fn with_compressor(mut self, compressor: impl Compressor + 'static) -> Self {
        self.compressor = Box::new(compressor);
        self
    }

    /// @acp:summary "Lint a file, a report becomes a `Lint` error"
    pub fn lint_file(&self, kind: &str, file: &Path) -> Result<()> {
        tracing::debug!("Linting {} as {}", file.display(), kind);
        match self.linter.lint(kind, file)? {
            Some(message) => Err(TesseraError::Lint {
                file: file.to_path_buf(),
                message,
            }),
            None => Ok(()),
        }
    }

    pub fn minify_text(&self, kind: &str, source: &str, file: &Path) -> Result<Minified> {
        self.minifier.minify(kind, source, file)
    }

    /// @acp:summary "Minify `src` into `dest`, writing `<dest>.map` when a map is produced"
    pub fn minify_file(&self, kind: &str, src: &Path, dest: &Path) -> Result<Option<PathBuf>> {
        tracing::debug!("Minifying {} -> {}", src.display(), dest.display());
        let source = std::fs::read_to_string(src)?;
        let minified = self.minifier.minify(kind, &source, src)?;
        std::fs::write(dest, &minified.code)?;
        match minified.map {
            Some(map) => {
                let map_path = append_extension(dest, "map");
                std::fs::write(&map_path, map)?;
                Ok(Some(map_path))
            }
            None => Ok(None),
        }
    }

    pub fn gzip(&self, src: &Path, dest: &Path) -> Result<()> {
        tracing::debug!("Compressing {} -> {}", src.display(), dest.display());
        self.compressor.compress(src, dest)
    }
}

/// `a/b.js` + `gz` → `a/b.js.gz`
pub fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// `a/b.css` → `a/b.min.css`
pub fn minified_sibling(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}.min.{}", stem, ext.to_string_lossy()),
        None => format!("{}.min", stem),
    };
    path.with_file_name(name)
}
