//! @acp:module "Configuration"
//! @acp:summary "Build-plan configuration loading and defaults"
//! @acp:domain build
//! @acp:layer config
//!
//! `tessera.json` holds the shared roots, package metadata, folder
//! conventions, external tool commands and the ordered profile list.
//! Profiles are kept as raw JSON here; the plan loader merges each one over
//! the `default` profile before deserializing it into [`Profile`].

pub mod merge;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub use merge::merge_values;

/// Default config file name
pub const CONFIG_FILE: &str = "tessera.json";

/// Name of the profile every other profile inherits from
pub const DEFAULT_PROFILE: &str = "default";

/// @acp:summary "Main build configuration"
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Shared source root, relative to the config file
    #[serde(default = "default_src")]
    pub src: PathBuf,

    /// Shared destination root, relative to the config file
    #[serde(default = "default_dest")]
    pub dest: PathBuf,

    /// Rebuild every unit regardless of timestamps
    #[serde(default)]
    pub full_build: bool,

    /// Metadata stamped into every unit manifest
    #[serde(default)]
    pub package: PackageInfo,

    /// Folder and sidecar names of the source tree convention
    #[serde(default)]
    pub conventions: Conventions,

    /// External lint/minify commands per file kind
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Docs and tests hook commands
    #[serde(default)]
    pub hooks: HookConfig,

    /// Ordered profile declarations (raw, merged at plan time)
    #[serde(default = "default_profiles")]
    pub profiles: Vec<serde_json::Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            src: default_src(),
            dest: default_dest(),
            full_build: false,
            package: PackageInfo::default(),
            conventions: Conventions::default(),
            tools: ToolsConfig::default(),
            hooks: HookConfig::default(),
            profiles: default_profiles(),
        }
    }
}

impl Config {
    /// @acp:summary "Load config from a tessera.json file"
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// @acp:summary "Save config to a file"
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

fn default_src() -> PathBuf {
    PathBuf::from("src")
}

fn default_dest() -> PathBuf {
    PathBuf::from("dist")
}

fn default_profiles() -> Vec<serde_json::Value> {
    vec![serde_json::json!({ "name": DEFAULT_PROFILE })]
}

fn default_true() -> bool {
    true
}

/// @acp:summary "Package metadata copied into manifests"
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub copyright: String,
    #[serde(default)]
    pub license: String,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

impl Default for PackageInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            version: default_version(),
            copyright: String::new(),
            license: String::new(),
        }
    }
}

/// @acp:summary "Folder and file names of the source tree convention"
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Conventions {
    pub includes: String,
    pub globals: String,
    pub components: String,
    pub types: String,
    pub resources: String,
    pub assets: String,
    pub libs: String,
    pub locales: String,
    pub docs: String,
    pub tests: String,
    /// Custom template in the unit root
    pub template: String,
    pub settings: String,
    pub config: String,
    pub info: String,
    /// Extension of script members and bundle outputs
    pub script_ext: String,
}

impl Default for Conventions {
    fn default() -> Self {
        Self {
            includes: "(includes)".to_string(),
            globals: "(globals)".to_string(),
            components: "(components)".to_string(),
            types: "(types)".to_string(),
            resources: "(resources)".to_string(),
            assets: "(assets)".to_string(),
            libs: "(libs)".to_string(),
            locales: "(locales)".to_string(),
            docs: "(docs)".to_string(),
            tests: "(tests)".to_string(),
            template: "index.js".to_string(),
            settings: "settings.json".to_string(),
            config: "config.json".to_string(),
            info: "info.json".to_string(),
            script_ext: "js".to_string(),
        }
    }
}

/// @acp:summary "External command line, program followed by arguments"
pub type CommandLine = Vec<String>;

/// @acp:summary "External tool commands keyed by file kind (extension)"
///
/// A lint command receives the file as its last argument and fails the lint
/// with its combined output when it exits non-zero. A minify command prints
/// the minified code to stdout. Kinds without a command use the built-in
/// implementation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsConfig {
    #[serde(default)]
    pub lint: HashMap<String, CommandLine>,
    #[serde(default)]
    pub minify: HashMap<String, CommandLine>,
}

/// @acp:summary "Shell commands behind the docs/tests unit hooks"
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests: Option<String>,
}

/// @acp:summary "Where unit manifests are aggregated into a preamble file"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PreambleScope {
    #[default]
    Group,
    Profile,
    None,
}

/// @acp:summary "Resolved settings of one profile (collection)"
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,

    /// Source root token: '', '@', literal, or '@<profile>'
    #[serde(default)]
    pub src: String,

    /// Destination root token, same grammar as `src`
    #[serde(default)]
    pub dest: String,

    /// Explicit group folders; discovered when empty
    #[serde(default)]
    pub groups: Vec<String>,

    /// Folders of the collection root that are never units
    #[serde(default = "default_special_folders")]
    pub special_folders: Vec<String>,

    /// Unit names to leave out (wildcards)
    #[serde(default)]
    pub skip_units: Vec<String>,

    #[serde(default)]
    pub preamble: PreambleScope,

    #[serde(default = "default_true")]
    pub lint: bool,

    #[serde(default)]
    pub minify: bool,

    #[serde(default)]
    pub gzip: bool,

    /// Unit names whose minified bundle is scrambled (wildcards)
    #[serde(default)]
    pub scramble: Vec<String>,

    /// Wrap each type in an async immediately-invoked function
    #[serde(default)]
    pub async_types: bool,

    #[serde(default = "default_lint_types")]
    pub lint_types: Vec<String>,

    #[serde(default = "default_minify_types")]
    pub minify_types: Vec<String>,

    #[serde(default = "default_gzip_types")]
    pub gzip_types: Vec<String>,

    /// Resource extensions embedded as utf8 text, everything else is binary
    #[serde(default = "default_text_types")]
    pub text_types: Vec<String>,

    #[serde(default)]
    pub exclude: ExcludeRules,

    #[serde(default)]
    pub locales: LocaleSettings,

    /// Invoke the docs hook after each unit
    #[serde(default)]
    pub docs: bool,

    /// Invoke the tests hook after each unit
    #[serde(default)]
    pub tests: bool,

    #[serde(default)]
    pub tasks: Tasks,
}

impl Profile {
    /// Profile with every setting at its default
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            src: String::new(),
            dest: String::new(),
            groups: Vec::new(),
            special_folders: default_special_folders(),
            skip_units: Vec::new(),
            preamble: PreambleScope::default(),
            lint: true,
            minify: false,
            gzip: false,
            scramble: Vec::new(),
            async_types: false,
            lint_types: default_lint_types(),
            minify_types: default_minify_types(),
            gzip_types: default_gzip_types(),
            text_types: default_text_types(),
            exclude: ExcludeRules::default(),
            locales: LocaleSettings::default(),
            docs: false,
            tests: false,
            tasks: Tasks::default(),
        }
    }
}

fn default_special_folders() -> Vec<String> {
    vec!["(shared)".to_string(), "(docs)".to_string(), "(tests)".to_string()]
}

fn default_lint_types() -> Vec<String> {
    vec!["js".to_string(), "json".to_string(), "css".to_string()]
}

fn default_minify_types() -> Vec<String> {
    vec!["js".to_string(), "json".to_string(), "css".to_string()]
}

fn default_gzip_types() -> Vec<String> {
    vec!["js".to_string(), "css".to_string(), "json".to_string(), "svg".to_string()]
}

fn default_text_types() -> Vec<String> {
    ["txt", "json", "html", "htm", "css", "js", "md", "xml", "svg"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// @acp:summary "Wildcard exclusion lists"
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExcludeRules {
    /// Files and folders left out of classification
    pub files: Vec<String>,
    pub lint: Vec<String>,
    pub minify: Vec<String>,
    pub gzip: Vec<String>,
    /// Member names that receive no metadata annotation
    pub inject: Vec<String>,
}

/// @acp:summary "Localized asset settings"
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleSettings {
    /// Build locale variants besides the default
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_locale")]
    pub default: String,

    #[serde(default)]
    pub list: Vec<String>,

    /// Copy default-locale content when a replica is missing
    #[serde(default = "default_true")]
    pub fallback: bool,
}

fn default_locale() -> String {
    "en".to_string()
}

impl Default for LocaleSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            default: default_locale(),
            list: Vec::new(),
            fallback: true,
        }
    }
}

/// @acp:summary "Shell commands run before/after each plan level"
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Tasks {
    pub pre_profile: Vec<String>,
    pub post_profile: Vec<String>,
    pub pre_group: Vec<String>,
    pub post_group: Vec<String>,
    pub pre_unit: Vec<String>,
    pub post_unit: Vec<String>,
}
