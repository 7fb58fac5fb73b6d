//! @acp:module "Resource Stage"
//! @acp:summary "Embed resources as base64 registration calls"
//! @acp:domain build
//! @acp:layer service

use std::fs;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::Gates;
use crate::error::{Result, TesseraError};
use crate::tools::Toolchain;
use crate::unit::Unit;

fn quoted(text: &str) -> String {
    serde_json::Value::String(text.to_string()).to_string()
}

/// @acp:summary "Emit one `tessera.resource(...)` call per resource file"
///
/// Returns the generated code and the registered resource names.
pub fn embed(unit: &Unit, toolchain: &Toolchain, gates: &Gates) -> Result<(String, Vec<String>)> {
    let mut out = String::new();
    let mut names = Vec::with_capacity(unit.categories.resources.len());

    for file in &unit.categories.resources {
        if gates.lint(&file.ext, &file.rel) {
            toolchain.lint_file(&file.ext, &file.path)?;
        }

        let is_text = unit.profile.text_types.contains(&file.ext);
        let bytes = if is_text {
            let text = String::from_utf8(fs::read(&file.path)?)
                .map_err(|_| TesseraError::processing(&file.path, "text resource is not valid UTF-8"))?;
            let text = if gates.minify(&file.ext, &file.rel) {
                toolchain.minify_text(&file.ext, &text, &file.path)?.code
            } else {
                text
            };
            text.into_bytes()
        } else {
            fs::read(&file.path)?
        };

        let encoding = if is_text { "utf8" } else { "binary" };
        let description = unit
            .info
            .resources
            .get(&file.name)
            .map(String::as_str)
            .unwrap_or_default();

        out.push_str(&format!(
            "tessera.resource({}, {}, {}, {}, {}, {});\n",
            quoted(&unit.name),
            quoted(&file.name),
            quoted(file.rel_below(&unit.conventions.resources)),
            quoted(description),
            quoted(encoding),
            quoted(&STANDARD.encode(&bytes)),
        ));
        names.push(file.name.clone());
    }

    Ok((out, names))
}
