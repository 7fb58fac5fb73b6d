//! @acp:module "Post-processing"
//! @acp:summary "Write, lint, minify, scramble and compress the unit bundle"
//! @acp:domain build
//! @acp:layer service

use std::fs;
use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::Gates;
use crate::error::Result;
use crate::tools::{append_extension, Toolchain};
use crate::unit::Unit;

/// Files written for one unit bundle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Artifacts {
    pub main: PathBuf,
    pub minified: Option<PathBuf>,
    pub source_map: Option<PathBuf>,
    pub scrambled: bool,
    pub compressed: Option<PathBuf>,
}

/// One-line loader that replaces a scrambled bundle
pub fn scramble(code: &str) -> String {
    format!("tessera.unscramble(\"{}\");\n", STANDARD.encode(code))
}

/// @acp:summary "Post-process the rendered bundle; each step can abort the unit"
pub fn finish(unit: &Unit, text: &str, toolchain: &Toolchain, gates: &Gates) -> Result<Artifacts> {
    let ext = &unit.conventions.script_ext;
    let paths = &unit.paths;

    if let Some(parent) = paths.main.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&paths.main, text)?;
    let mut artifacts = Artifacts {
        main: paths.main.clone(),
        ..Artifacts::default()
    };

    if gates.lint(ext, &unit.name) {
        toolchain.lint_file(ext, &paths.main)?;
    }

    if gates.minify(ext, &unit.name) {
        artifacts.source_map = toolchain.minify_file(ext, &paths.main, &paths.minified)?;
        artifacts.minified = Some(paths.minified.clone());

        if gates.scramble(&unit.name) {
            let minified = fs::read_to_string(&paths.minified)?;
            fs::write(&paths.minified, scramble(&minified))?;
            artifacts.scrambled = true;
            tracing::debug!("Scrambled {}", paths.minified.display());
        }
    }

    if gates.gzip(ext, &unit.name) {
        let target = artifacts.minified.as_ref().unwrap_or(&artifacts.main);
        let compressed = append_extension(target, "gz");
        toolchain.gzip(target, &compressed)?;
        artifacts.compressed = Some(compressed);
    }

    Ok(artifacts)
}
