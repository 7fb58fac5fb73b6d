//! @acp:module "Member Stages"
//! @acp:summary "Includes, globals, components and types stages"
//! @acp:domain build
//! @acp:layer service

use std::fs;

use super::inject::{metadata_lines, Injections};
use super::{region, Gates};
use crate::cache::TypeEntry;
use crate::error::{Result, TesseraError};
use crate::parse::{detect_definition, Detection, DefinitionKind};
use crate::scan::SourceFile;
use crate::tools::Toolchain;
use crate::unit::Unit;

/// Definition keywords allowed in `(components)`
pub const COMPONENT_KINDS: &[DefinitionKind] = &[DefinitionKind::Component];

/// Definition keywords allowed in `(types)`
pub const TYPE_KINDS: &[DefinitionKind] = &[
    DefinitionKind::Class,
    DefinitionKind::Struct,
    DefinitionKind::Mixin,
    DefinitionKind::Interface,
    DefinitionKind::Enum,
];

/// How each definition is enclosed in the bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Region only
    Shared,
    /// Region inside an immediately-invoked function
    Isolated { asynchronous: bool },
}

fn lint_member(file: &SourceFile, toolchain: &Toolchain, gates: &Gates) -> Result<()> {
    if gates.lint(&file.ext, &file.rel) {
        toolchain.lint_file(&file.ext, &file.path)?;
    }
    Ok(())
}

/// @acp:summary "Concatenate includes verbatim, region-wrapped"
pub fn includes(unit: &Unit) -> Result<String> {
    let mut out = String::new();
    for file in &unit.categories.includes {
        if file.ext != unit.conventions.script_ext {
            return Err(TesseraError::processing(
                &file.path,
                format!("includes accept only .{} files", unit.conventions.script_ext),
            ));
        }
        let content = fs::read_to_string(&file.path)?;
        out.push_str(&region::wrap(&file.name, &file.rel, &content));
    }
    Ok(out)
}

/// @acp:summary "Lint and concatenate global code, region-wrapped"
pub fn globals(unit: &Unit, toolchain: &Toolchain, gates: &Gates) -> Result<String> {
    let mut out = String::new();
    for file in &unit.categories.globals {
        lint_member(file, toolchain, gates)?;
        let content = fs::read_to_string(&file.path)?;
        out.push_str(&region::wrap(&file.name, &file.rel, &content));
    }
    Ok(out)
}

/// @acp:summary "Detect, annotate and wrap one definition per file"
pub fn definitions(
    unit: &Unit,
    files: &[SourceFile],
    allowed: &[DefinitionKind],
    scope: Scope,
    toolchain: &Toolchain,
    gates: &Gates,
) -> Result<(String, Vec<TypeEntry>)> {
    let mut out = String::new();
    let mut entries = Vec::with_capacity(files.len());

    for file in files {
        lint_member(file, toolchain, gates)?;
        let content = fs::read_to_string(&file.path)?;
        let qualified = file.qualified_name();

        let definition = match detect_definition(&content) {
            Detection::Single(definition) => definition,
            Detection::None => {
                return Err(TesseraError::definition(
                    &file.path,
                    "no top-level definition found",
                ))
            }
            Detection::Multiple(found) => {
                let lines = found
                    .iter()
                    .map(|d| d.line.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(TesseraError::definition(
                    &file.path,
                    format!("{} definitions found (lines {})", found.len(), lines),
                ));
            }
        };

        if !allowed.contains(&definition.kind) {
            let expected = allowed
                .iter()
                .map(DefinitionKind::keyword)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(TesseraError::definition(
                &file.path,
                format!(
                    "'{}' is not allowed here (expected {})",
                    definition.kind.keyword(),
                    expected
                ),
            ));
        }

        let mut injections = Injections::new();
        if gates.inject(&qualified) {
            injections.insert(
                definition.line_start,
                metadata_lines(&unit.manifest.id, definition.kind.as_str(), &qualified),
            );
        }
        let wrapped = region::wrap(&qualified, &file.rel, &injections.render(&content));

        match scope {
            Scope::Shared => out.push_str(&wrapped),
            Scope::Isolated { asynchronous: false } => {
                out.push_str("(function () {\n");
                out.push_str(&wrapped);
                out.push_str("})();\n");
            }
            Scope::Isolated { asynchronous: true } => {
                out.push_str("await (async function () {\n");
                out.push_str(&wrapped);
                out.push_str("})();\n");
            }
        }

        entries.push(TypeEntry {
            name: qualified,
            kind: definition.kind.as_str().to_string(),
        });
    }

    Ok((out, entries))
}
