//! @acp:module "Incremental Build Decider"
//! @acp:summary "Skip-vs-rebuild decision from output mtime and the manifest cache"
//! @acp:domain build
//! @acp:layer service
//!
//! Skipping is only considered when the build is incremental and both the
//! cache file and the main output exist. The classifier walk then doubles as
//! the freshness probe: one file strictly newer than the main output forces a
//! rebuild.

use std::path::Path;

use super::UnitPaths;
use crate::cache::Manifest;
use crate::error::Result;
use crate::scan::{Classification, Classifier};

/// Outcome of the decision for one unit
#[derive(Debug)]
pub struct Decision {
    pub classification: Classification,
    /// Cached manifest to reuse; `None` means rebuild
    pub cached: Option<Manifest>,
}

impl Decision {
    pub fn skip(&self) -> bool {
        self.cached.is_some()
    }
}

/// @acp:summary "Classify the unit sources and decide whether the previous output holds"
pub fn decide(
    src: &Path,
    paths: &UnitPaths,
    full_build: bool,
    classifier: &Classifier,
) -> Result<Decision> {
    let watermark = if full_build || !paths.cache_file.is_file() || !paths.main.is_file() {
        None
    } else {
        Some(std::fs::metadata(&paths.main)?.modified()?)
    };

    let classification = classifier.classify(src, watermark)?;
    if watermark.is_none() || classification.changed {
        return Ok(Decision {
            classification,
            cached: None,
        });
    }

    let cached = match Manifest::from_json(&paths.cache_file) {
        Ok(manifest) => Some(manifest),
        Err(e) => {
            tracing::warn!(
                "Ignoring unreadable cache {}: {}",
                paths.cache_file.display(),
                e
            );
            None
        }
    };
    Ok(Decision {
        classification,
        cached,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        src: std::path::PathBuf,
        paths: UnitPaths,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src/shell");
        let dest = dir.path().join("dist");
        fs::create_dir_all(src.join("(globals)")).unwrap();
        fs::create_dir_all(&dest).unwrap();
        fs::write(src.join("(globals)/a.js"), "var a = 1;").unwrap();
        let paths = UnitPaths::new(&dest, "shell", "js");
        Fixture {
            _dir: dir,
            src,
            paths,
        }
    }

    fn write_outputs(paths: &UnitPaths) {
        fs::write(&paths.main, "bundle").unwrap();
        Manifest::new("shell", "./shell.js")
            .write_json(&paths.cache_file)
            .unwrap();
        // Push the output into the future so sources look older
        let later = SystemTime::now() + Duration::from_secs(60);
        fs::File::options()
            .write(true)
            .open(&paths.main)
            .unwrap()
            .set_modified(later)
            .unwrap();
    }

    fn classifier() -> Classifier {
        Classifier::new::<&str>(&[]).unwrap()
    }

    #[test]
    fn test_no_previous_output_rebuilds() {
        let f = fixture();
        let decision = decide(&f.src, &f.paths, false, &classifier()).unwrap();
        assert!(!decision.skip());
        assert_eq!(decision.classification.files.len(), 1);
    }

    #[test]
    fn test_unchanged_sources_skip() {
        let f = fixture();
        write_outputs(&f.paths);
        let decision = decide(&f.src, &f.paths, false, &classifier()).unwrap();
        assert!(decision.skip());
        assert_eq!(decision.cached.unwrap().name, "shell");
    }

    #[test]
    fn test_full_build_never_skips() {
        let f = fixture();
        write_outputs(&f.paths);
        assert!(!decide(&f.src, &f.paths, true, &classifier()).unwrap().skip());
    }

    #[test]
    fn test_newer_source_rebuilds() {
        let f = fixture();
        write_outputs(&f.paths);
        let newer = SystemTime::now() + Duration::from_secs(120);
        fs::File::options()
            .write(true)
            .open(f.src.join("(globals)/a.js"))
            .unwrap()
            .set_modified(newer)
            .unwrap();
        assert!(!decide(&f.src, &f.paths, false, &classifier()).unwrap().skip());
    }

    #[test]
    fn test_corrupt_cache_rebuilds() {
        let f = fixture();
        write_outputs(&f.paths);
        fs::write(&f.paths.cache_file, "{ not json").unwrap();
        assert!(!decide(&f.src, &f.paths, false, &classifier()).unwrap().skip());
    }
}
