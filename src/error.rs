//! @acp:module "Errors"
//! @acp:summary "Error taxonomy for plan loading, classification and unit assembly"
//! @acp:domain build
//! @acp:layer model
//!
//! Every failure propagates to the command layer unchanged; nothing in the
//! pipeline catches or retries.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, TesseraError>;

/// @acp:summary "All errors raised by the build pipeline"
#[derive(Debug, Error)]
pub enum TesseraError {
    /// Unknown or missing profile, unresolved alias, invalid setting
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Separator in a base name, duplicate base name, duplicate qualified name
    #[error("naming violation in {}: {message}", .file.display())]
    NamingViolation { file: PathBuf, message: String },

    /// Zero, several, or a disallowed top-level definition
    #[error("definition detection failed for {}: {message}", .file.display())]
    DefinitionDetection { file: PathBuf, message: String },

    /// Lint tool reported problems
    #[error("lint failed for {}:\n{message}", .file.display())]
    Lint { file: PathBuf, message: String },

    /// Minify, encode or compress failure, unsupported input
    #[error("processing failed for {}: {message}", .file.display())]
    Processing { file: PathBuf, message: String },

    /// No locale replica and fallback disabled
    #[error("missing localization of {} for locale '{locale}'", .file.display())]
    LocalizationMissing { file: PathBuf, locale: String },

    /// Task or docs/tests hook exited unsuccessfully
    #[error("hook '{name}' failed: {message}")]
    Hook { name: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid wildcard pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

impl TesseraError {
    pub fn naming(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::NamingViolation {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn definition(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::DefinitionDetection {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn processing(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Processing {
            file: file.into(),
            message: message.into(),
        }
    }
}
