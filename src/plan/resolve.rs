//! @acp:module "Root Tokens"
//! @acp:summary "Resolve profile src/dest tokens against the shared roots"
//! @acp:domain build
//! @acp:layer config

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Result, TesseraError};

/// Resolved roots of the profiles loaded so far, in declaration order
#[derive(Debug, Default)]
pub struct ResolvedRoots {
    roots: HashMap<String, (PathBuf, PathBuf)>,
}

/// Which root of a profile a token names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind {
    Src,
    Dest,
}

impl ResolvedRoots {
    pub fn insert(&mut self, profile: &str, src: PathBuf, dest: PathBuf) {
        self.roots.insert(profile.to_string(), (src, dest));
    }

    /// Resolve one token:
    /// - `''` the shared root
    /// - `'@'` the shared root joined with the profile's own name
    /// - `'@<other>'` the same root of a profile declared earlier
    /// - anything else a folder below the shared root
    pub fn resolve(&self, token: &str, shared: &Path, own_name: &str, kind: RootKind) -> Result<PathBuf> {
        match token {
            "" => Ok(shared.to_path_buf()),
            "@" => Ok(shared.join(own_name)),
            alias if alias.starts_with('@') => {
                let other = &alias[1..];
                let (src, dest) = self.roots.get(other).ok_or_else(|| {
                    TesseraError::Configuration(format!(
                        "profile '{}' refers to '{}', which is not declared before it",
                        own_name, alias
                    ))
                })?;
                Ok(match kind {
                    RootKind::Src => src.clone(),
                    RootKind::Dest => dest.clone(),
                })
            }
            literal => Ok(shared.join(literal)),
        }
    }
}
