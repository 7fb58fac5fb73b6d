//! End-to-end build tests
//!
//! Each test lays out a tessera.json plus a source tree in a temp folder and
//! runs the orchestrator over it.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::TempDir;

use tessera::{BuildOptions, BuildSummary, Config, Manifest, Orchestrator, Reporter, TesseraError};

struct Project {
    dir: TempDir,
    config: Config,
}

impl Project {
    fn new(profiles: Value) -> Self {
        let config = serde_json::from_value(json!({
            "package": { "version": "2.1.0", "license": "MIT" },
            "profiles": profiles
        }))
        .unwrap();
        Self {
            dir: TempDir::new().unwrap(),
            config,
        }
    }

    fn single(profile: Value) -> Self {
        let mut profile = profile;
        profile["name"] = json!("default");
        Self::new(json!([profile]))
    }

    fn write(&self, rel: &str, content: &str) {
        let path = self.dir.path().join("src").join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn dist(&self, rel: &str) -> PathBuf {
        self.dir.path().join("dist").join(rel)
    }

    async fn build(&self, full_build: bool) -> tessera::Result<BuildSummary> {
        let mut orchestrator =
            Orchestrator::new(&self.config, self.dir.path()).with_reporter(Reporter::new(true));
        orchestrator
            .run(&BuildOptions {
                full_build,
                profiles: Vec::new(),
            })
            .await
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

const SHELL: &str = "Component('Shell', {\n    render() {\n        return '<main></main>';\n    }\n});\n";

mod assembly_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_single_component_bundle() {
        let project = Project::single(json!({}));
        project.write("shell/(components)/Shell.js", SHELL);

        let summary = project.build(false).await.unwrap();
        assert_eq!(summary.built, 1);
        assert_eq!(summary.skipped, 0);

        let main = read(&project.dist("shell.js"));
        assert!(main.contains("// region: Shell [(components)/Shell.js]"));
        assert!(main.contains("// endregion: Shell"));
        assert!(main.contains("tessera.meta('kind', \"component\");"));
        assert!(main.contains("tessera.meta('name', \"Shell\");"));
        assert!(main.contains("tessera.register("));
        assert!(!main.contains("<<components>>"));

        let manifest = Manifest::from_json(project.dist("shell.cache.json")).unwrap();
        assert_eq!(manifest.name, "shell");
        assert_eq!(manifest.file, "./shell.js");
        assert_eq!(manifest.version, "2.1.0");
        assert_eq!(manifest.count_kind("component"), 1);
        assert_eq!(manifest.types[0].name, "Shell");
    }

    #[tokio::test]
    async fn test_member_order_follows_markers() {
        let project = Project::single(json!({}));
        project.write("shell/(globals)/(#2).late.js", "var late = 2;\n");
        project.write("shell/(globals)/(#1).early.js", "var early = 1;\n");
        project.write("shell/(components)/Shell.js", SHELL);

        project.build(false).await.unwrap();

        let main = read(&project.dist("shell.js"));
        let early = main.find("var early").unwrap();
        let late = main.find("var late").unwrap();
        let shell = main.find("Component('Shell'").unwrap();
        assert!(early < late);
        assert!(late < shell);
    }

    #[tokio::test]
    async fn test_types_are_isolated_and_namespaced() {
        let project = Project::single(json!({ "asyncTypes": true }));
        project.write("shell/(types)/ui/Button.js", "Class('Button', {});\n");
        project.write("shell/(types)/ui/(@).icon.svg", "<svg/>");

        project.build(false).await.unwrap();

        let main = read(&project.dist("shell.js"));
        assert!(main.contains("await (async function () {"));
        assert!(main.contains("tessera.meta('name', \"ui.Button\");"));
        assert!(project.dist("shell/ui/icon.svg").is_file());

        let manifest = Manifest::from_json(project.dist("shell.cache.json")).unwrap();
        assert_eq!(manifest.namespaces.len(), 1);
        assert_eq!(manifest.namespaces[0].name, "ui");
        assert_eq!(manifest.assets.len(), 1);
    }

    #[tokio::test]
    async fn test_resources_embedded() {
        let project = Project::single(json!({}));
        project.write("shell/(components)/Shell.js", SHELL);
        project.write("shell/(resources)/banner.txt", "hello");

        project.build(false).await.unwrap();

        let main = read(&project.dist("shell.js"));
        assert!(main.contains("tessera.resource("));
        assert!(main.contains("\"utf8\""));
        assert!(main.contains("\"banner\""));
        assert!(main.contains("\"aGVsbG8=\""));
    }

    #[tokio::test]
    async fn test_two_definitions_rejected() {
        let project = Project::single(json!({}));
        project.write(
            "shell/(components)/Shell.js",
            "Component('A', {});\nComponent('B', {});\n",
        );

        let err = project.build(false).await.unwrap_err();
        match err {
            TesseraError::DefinitionDetection { message, .. } => {
                assert!(message.contains("2 definitions"));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(!project.dist("shell.js").exists());
        assert!(!project.dist("shell.cache.json").exists());
    }

    #[tokio::test]
    async fn test_component_keyword_not_allowed_in_types() {
        let project = Project::single(json!({}));
        project.write("shell/(types)/ui/Panel.js", "Component('Panel', {});\n");

        let err = project.build(false).await.unwrap_err();
        assert!(matches!(err, TesseraError::DefinitionDetection { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_qualified_names_across_units() {
        let project = Project::single(json!({}));
        project.write("alpha/(types)/ui/Button.js", "Class('Button', {});\n");
        project.write("beta/(types)/ui/Button.js", "Class('Button', {});\n");

        let err = project.build(false).await.unwrap_err();
        match err {
            TesseraError::NamingViolation { message, .. } => {
                assert!(message.contains("ui.Button"));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(project.dist("alpha.js").is_file());
    }

    #[tokio::test]
    async fn test_dotted_base_name_rejected() {
        let project = Project::single(json!({}));
        project.write("shell/(components)/Shell.view.js", SHELL);

        let err = project.build(false).await.unwrap_err();
        assert!(matches!(err, TesseraError::NamingViolation { .. }));
    }

    #[tokio::test]
    async fn test_quote_in_unit_name_stays_valid_script() {
        let project = Project::single(json!({}));
        project.write("it's/(components)/Shell.js", SHELL);

        project.build(false).await.unwrap();

        let main = read(&project.dist("it's.js"));
        assert!(main.contains("\"name\":\"it's\""));
        assert!(main.contains("\"file\":\"./it's.js\""));
        assert!(!main.contains("'it's'"));
    }

    #[tokio::test]
    async fn test_global_lint_failure_aborts_unit() {
        let project = Project::single(json!({}));
        project.write("shell/(globals)/setup.js", "function setup() {\n    run();\n");
        project.write("shell/(components)/Shell.js", SHELL);

        let err = project.build(false).await.unwrap_err();
        match err {
            TesseraError::Lint { file, message } => {
                assert!(file.ends_with("(globals)/setup.js"));
                assert!(message.contains("never closed"));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(!project.dist("shell.js").exists());
        assert!(!project.dist("shell.cache.json").exists());
    }

    #[tokio::test]
    async fn test_bundle_lint_failure_aborts_unit() {
        let project = Project::single(json!({}));
        project.write("shell/index.js", "(function () {\n<<components>>\n<<manifest>>\n");
        project.write("shell/(components)/Shell.js", SHELL);

        let err = project.build(false).await.unwrap_err();
        match err {
            TesseraError::Lint { file, .. } => assert_eq!(file, project.dist("shell.js")),
            other => panic!("unexpected error: {}", other),
        }
        assert!(!project.dist("shell.cache.json").exists());
    }

    #[tokio::test]
    async fn test_non_script_include_rejected() {
        let project = Project::single(json!({}));
        project.write("shell/(includes)/reset.css", "body { margin: 0; }\n");
        project.write("shell/(components)/Shell.js", SHELL);

        let err = project.build(false).await.unwrap_err();
        assert!(matches!(err, TesseraError::Processing { .. }));
        assert!(!project.dist("shell.js").exists());
    }
}

mod incremental_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_second_run_is_skipped() {
        let project = Project::single(json!({}));
        project.write("shell/(components)/Shell.js", SHELL);
        project.write("shell/(assets)/logo.png", "png");

        let first = project.build(false).await.unwrap();
        assert_eq!(first.built, 1);

        let second = project.build(false).await.unwrap();
        assert_eq!(second.built, 0);
        assert_eq!(second.skipped, 1);
        let cached = Manifest::from_json(project.dist("shell.cache.json")).unwrap();

        let full = project.build(true).await.unwrap();
        assert_eq!(full.built, 1);
        let rebuilt = Manifest::from_json(project.dist("shell.cache.json")).unwrap();

        assert_eq!(cached.stable_view(), rebuilt.stable_view());
        assert_ne!(cached.id, rebuilt.id);
    }

    #[tokio::test]
    async fn test_missing_cache_forces_rebuild() {
        let project = Project::single(json!({}));
        project.write("shell/(components)/Shell.js", SHELL);

        project.build(false).await.unwrap();
        fs::remove_file(project.dist("shell.cache.json")).unwrap();

        let summary = project.build(false).await.unwrap();
        assert_eq!(summary.built, 1);
        assert!(project.dist("shell.cache.json").is_file());
    }

    #[tokio::test]
    async fn test_skipped_unit_still_registers_names() {
        let project = Project::single(json!({}));
        project.write("alpha/(types)/ui/Button.js", "Class('Button', {});\n");
        project.build(false).await.unwrap();

        project.write("beta/(types)/ui/Button.js", "Class('Button', {});\n");
        let err = project.build(false).await.unwrap_err();
        assert!(matches!(err, TesseraError::NamingViolation { .. }));
    }
}

mod locale_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn localized_project(fallback: bool) -> Project {
        let project = Project::single(json!({
            "locales": { "enabled": true, "default": "en", "list": ["en", "fr", "de"], "fallback": fallback }
        }));
        project.write("shell/(types)/ui/($).labels.json", "{\"ok\":\"OK\"}");
        project.write("shell/(locales)/de/ui/labels.json", "{\"ok\":\"Gut\"}");
        project
    }

    #[tokio::test]
    async fn test_missing_replica_falls_back_to_default() {
        let project = localized_project(true);

        project.build(false).await.unwrap();

        let en = read(&project.dist("shell/locales/en/ui/labels.json"));
        let fr = read(&project.dist("shell/locales/fr/ui/labels.json"));
        let de = read(&project.dist("shell/locales/de/ui/labels.json"));
        assert_eq!(en, "{\"ok\":\"OK\"}");
        assert_eq!(fr, en);
        assert_eq!(de, "{\"ok\":\"Gut\"}");
    }

    #[tokio::test]
    async fn test_missing_replica_without_fallback() {
        let project = localized_project(false);

        let err = project.build(false).await.unwrap_err();
        match err {
            TesseraError::LocalizationMissing { locale, .. } => assert_eq!(locale, "fr"),
            other => panic!("unexpected error: {}", other),
        }
    }
}

mod post_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_scrambled_bundle_is_one_line() {
        let project = Project::single(json!({ "minify": true, "scramble": ["shell"] }));
        project.write("shell/(components)/Shell.js", SHELL);

        project.build(false).await.unwrap();

        let minified = read(&project.dist("shell.min.js"));
        assert_eq!(minified.lines().count(), 1);
        assert!(minified.starts_with("tessera.unscramble(\""));
        assert!(read(&project.dist("shell.js")).contains("Component('Shell'"));
    }

    #[tokio::test]
    async fn test_gzip_round_trips_bundle_and_assets() {
        let project = Project::single(json!({ "gzip": true }));
        project.write("shell/(components)/Shell.js", SHELL);
        project.write("shell/(assets)/data/list.json", "[1, 2, 3]");

        project.build(false).await.unwrap();

        let mut unpacked = String::new();
        GzDecoder::new(fs::File::open(project.dist("shell.js.gz")).unwrap())
            .read_to_string(&mut unpacked)
            .unwrap();
        assert_eq!(unpacked, read(&project.dist("shell.js")));
        assert!(project.dist("shell/data/list.json.gz").is_file());
    }

    #[tokio::test]
    async fn test_minified_asset_sibling() {
        let project = Project::single(json!({ "minify": true }));
        project.write("shell/(components)/Shell.js", SHELL);
        project.write("shell/(assets)/data.json", "{\n  \"a\": 1\n}\n");

        project.build(false).await.unwrap();

        assert_eq!(read(&project.dist("shell/data.min.json")), "{\"a\":1}");
        assert_eq!(read(&project.dist("shell/data.json")), "{\n  \"a\": 1\n}\n");
    }

    #[tokio::test]
    async fn test_gzip_prefers_minified_bundle() {
        let project = Project::single(json!({ "minify": true, "gzip": true }));
        project.write("shell/(components)/Shell.js", SHELL);

        project.build(false).await.unwrap();

        assert!(project.dist("shell.min.js.gz").is_file());
        assert!(!project.dist("shell.js.gz").exists());

        let mut unpacked = String::new();
        GzDecoder::new(fs::File::open(project.dist("shell.min.js.gz")).unwrap())
            .read_to_string(&mut unpacked)
            .unwrap();
        assert_eq!(unpacked, read(&project.dist("shell.min.js")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_docs_hook_leaves_no_cache() {
        let mut project = Project::single(json!({ "docs": true }));
        project.config.hooks.docs = Some("echo no docs >&2; exit 4".to_string());
        project.write("shell/(components)/Shell.js", SHELL);

        let err = project.build(false).await.unwrap_err();
        match err {
            TesseraError::Hook { name, message } => {
                assert_eq!(name, "docs");
                assert!(message.contains("no docs"));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(project.dist("shell.js").is_file());
        assert!(!project.dist("shell.cache.json").exists());

        project.config.hooks.docs = Some("true".to_string());
        let summary = project.build(false).await.unwrap();
        assert_eq!(summary.built, 1);
        assert!(project.dist("shell.cache.json").is_file());
    }
}

mod preamble_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_group_preamble_lists_units() {
        let project = Project::single(json!({}));
        project.write("alpha/(components)/Alpha.js", "Component('Alpha', {});\n");
        project.write("beta/(components)/Beta.js", "Component('Beta', {});\n");

        let summary = project.build(false).await.unwrap();
        assert_eq!(summary.preambles, vec![project.dist("preamble.js")]);

        let preamble = read(&project.dist("preamble.js"));
        assert!(preamble.starts_with("tessera.preamble(["));
        let alpha = preamble.find("\"name\":\"alpha\"").unwrap();
        let beta = preamble.find("\"name\":\"beta\"").unwrap();
        assert!(alpha < beta);
    }

    #[tokio::test]
    async fn test_no_preamble_scope() {
        let project = Project::single(json!({ "preamble": "none" }));
        project.write("alpha/(components)/Alpha.js", "Component('Alpha', {});\n");

        let summary = project.build(false).await.unwrap();
        assert!(summary.preambles.is_empty());
        assert!(!project.dist("preamble.js").exists());
    }

    #[tokio::test]
    async fn test_profile_preamble_spans_groups() {
        let project = Project::single(json!({ "groups": ["core", "extra"], "preamble": "profile" }));
        project.write("core/alpha/(components)/Alpha.js", "Component('Alpha', {});\n");
        project.write("extra/beta/(components)/Beta.js", "Component('Beta', {});\n");

        let summary = project.build(false).await.unwrap();
        assert_eq!(summary.units(), 2);
        assert_eq!(summary.preambles, vec![project.dist("preamble.js")]);
        assert!(project.dist("core/alpha.js").is_file());

        let preamble = read(&project.dist("preamble.js"));
        assert!(preamble.contains("\"file\":\"./core/alpha.js\""));
        assert!(preamble.contains("\"file\":\"./extra/beta.js\""));
    }

    #[tokio::test]
    async fn test_unit_named_like_preamble_rejected() {
        let project = Project::single(json!({}));
        project.write("preamble/(components)/Panel.js", "Component('Panel', {});\n");

        let err = project.build(false).await.unwrap_err();
        assert!(matches!(err, TesseraError::Configuration(_)));
        assert!(!project.dist("preamble.js").exists());
    }

    #[tokio::test]
    async fn test_unit_named_like_preamble_without_preamble() {
        let project = Project::single(json!({ "preamble": "none" }));
        project.write("preamble/(components)/Panel.js", "Component('Panel', {});\n");

        project.build(false).await.unwrap();
        assert!(read(&project.dist("preamble.js")).contains("Component('Panel'"));
    }
}
