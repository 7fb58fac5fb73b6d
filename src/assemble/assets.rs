//! @acp:module "Asset Stage"
//! @acp:summary "Copy assets, libs, in-place and localized files into the unit's files folder"
//! @acp:domain build
//! @acp:layer service
//!
//! Destinations below `files/`:
//! - `(assets)/<path>` → `<path>`
//! - `(libs)/<path>` → `libs/<path>`
//! - `(types)/<ns>/(@).<path>` → `<ns>/<path>`
//! - `(types)/<ns>/($).<path>` → `locales/<locale>/<ns>/<path>`, one copy per locale
//!
//! A locale replica lives at `(locales)/<locale>/<ns>/<path>`.

use std::fs;
use std::path::Path;

use super::Gates;
use crate::cache::AssetEntry;
use crate::error::{Result, TesseraError};
use crate::scan::SourceFile;
use crate::tools::{append_extension, minified_sibling, Toolchain};
use crate::unit::Unit;

/// Locale folder below the files directory
pub const LOCALES_DIR: &str = "locales";

/// Library folder below the files directory
pub const LIBS_DIR: &str = "libs";

struct AssetCopier<'a> {
    unit: &'a Unit,
    toolchain: &'a Toolchain,
    gates: &'a Gates,
    full_build: bool,
    entries: Vec<AssetEntry>,
}

impl AssetCopier<'_> {
    /// Copy `src` to `files/<rel_dest>` and run the per-file tools
    fn copy(&mut self, src: &Path, rel_dest: &str) -> Result<()> {
        let dest = self.unit.paths.files_dir.join(rel_dest);
        let ext = dest
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        if self.full_build || !is_current(src, &dest)? {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(src, &dest)?;

            if self.gates.lint(&ext, rel_dest) {
                self.toolchain.lint_file(&ext, &dest)?;
            }
            if self.gates.minify(&ext, rel_dest) {
                self.toolchain.minify_file(&ext, &dest, &minified_sibling(&dest))?;
            }
            if self.gates.gzip(&ext, rel_dest) {
                self.toolchain.gzip(&dest, &append_extension(&dest, "gz"))?;
            }
        } else {
            tracing::debug!("Asset {} is current", rel_dest);
        }

        let size = fs::metadata(&dest)?.len();
        self.entries.push(AssetEntry::new(rel_dest, &ext, size));
        Ok(())
    }

    fn localized(&mut self, file: &SourceFile) -> Result<()> {
        let path = namespace_relative(file);
        let locales = &self.unit.profile.locales;

        self.copy(&file.path, &format!("{}/{}/{}", LOCALES_DIR, locales.default, path))?;
        if !locales.enabled {
            return Ok(());
        }

        for locale in locales.list.iter().filter(|l| **l != locales.default) {
            let dest = format!("{}/{}/{}", LOCALES_DIR, locale, path);
            let replica = self
                .unit
                .src
                .join(&self.unit.conventions.locales)
                .join(locale)
                .join(&path);

            if replica.is_file() {
                self.copy(&replica, &dest)?;
            } else if locales.fallback {
                tracing::debug!("No {} replica of {}, using {}", locale, path, locales.default);
                self.copy(&file.path, &dest)?;
            } else {
                return Err(TesseraError::LocalizationMissing {
                    file: file.path.clone(),
                    locale: locale.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Destination is at least as new as its source
fn is_current(src: &Path, dest: &Path) -> Result<bool> {
    if !dest.is_file() {
        return Ok(false);
    }
    Ok(fs::metadata(dest)?.modified()? >= fs::metadata(src)?.modified()?)
}

/// `<ns>/<path>` for a file inside a namespace folder
fn namespace_relative(file: &SourceFile) -> String {
    match &file.namespace {
        Some(ns) => format!("{}/{}", ns.name, file.rel_below(&ns.path)),
        None => file.canonical_rel.clone(),
    }
}

/// @acp:summary "Run the asset stage and return the manifest entries"
pub fn copy_assets(
    unit: &Unit,
    toolchain: &Toolchain,
    gates: &Gates,
    full_build: bool,
) -> Result<Vec<AssetEntry>> {
    let mut copier = AssetCopier {
        unit,
        toolchain,
        gates,
        full_build,
        entries: Vec::new(),
    };
    let categories = &unit.categories;

    for file in &categories.assets {
        copier.copy(&file.path, file.rel_below(&unit.conventions.assets))?;
    }
    for file in &categories.libs {
        let rel = format!("{}/{}", LIBS_DIR, file.rel_below(&unit.conventions.libs));
        copier.copy(&file.path, &rel)?;
    }
    for file in &categories.inplace_assets {
        copier.copy(&file.path, &namespace_relative(file))?;
    }
    for file in &categories.localized {
        copier.localized(file)?;
    }

    Ok(copier.entries)
}
