//! @acp:module "Preamble Writer"
//! @acp:summary "Bulk-registration file aggregating unit manifests"
//! @acp:domain build
//! @acp:layer io

use std::path::{Path, PathBuf};

use crate::cache::Manifest;
use crate::error::Result;

/// File name written in the aggregation point's destination
pub const PREAMBLE_FILE: &str = "preamble.js";

/// Render one `tessera.preamble([...])` call
pub fn render(manifests: &[Manifest]) -> Result<String> {
    let entries = manifests
        .iter()
        .map(Manifest::to_compact_json)
        .collect::<Result<Vec<_>>>()?;
    Ok(format!("tessera.preamble([\n{}\n]);\n", entries.join(",\n")))
}

/// @acp:summary "Write `preamble.js` into `dir`; nothing for an empty list"
pub fn write_preamble(dir: &Path, manifests: &[Manifest]) -> Result<Option<PathBuf>> {
    if manifests.is_empty() {
        return Ok(None);
    }
    std::fs::create_dir_all(dir)?;
    let path = dir.join(PREAMBLE_FILE);
    std::fs::write(&path, render(manifests)?)?;
    tracing::debug!("Wrote preamble for {} units to {}", manifests.len(), path.display());
    Ok(Some(path))
}
