//! Error types for tether-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::SourceName;

/// All errors that can arise from manifest and source-record operations.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Underlying I/O failure, annotated with the manifest path.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parse error on load — the file is not a JSON object of sources.
    #[error("failed to parse manifest at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization error (save path).
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The manifest file did not exist at the expected path.
    #[error("manifest not found at {path}")]
    ManifestNotFound { path: PathBuf },

    /// The top-level `$schema` key was present but not a string.
    #[error("manifest at {path} has a non-string `$schema` value")]
    InvalidSchemaRef { path: PathBuf },

    /// `init` was asked to create a manifest over an existing file.
    #[error("manifest already exists at {path}")]
    AlreadyExists { path: PathBuf },

    #[error("source '{name}' already exists")]
    DuplicateSource { name: SourceName },

    /// The name collides with the top-level `$schema` annotation key.
    #[error("'{name}' is reserved and cannot be used as a source name")]
    ReservedName { name: SourceName },

    #[error("source '{name}' does not exist")]
    NotFound { name: SourceName },

    #[error("invalid source type '{0}': must be 'binary' or 'git'")]
    InvalidSourceType(String),

    #[error("source '{name}' cannot be pinned and forced at the same time")]
    PinForceConflict { name: SourceName },

    /// Only git sources track a resolved version.
    #[error("source '{name}' sets a version but is not a git source")]
    VersionRequiresGit { name: SourceName },
}

/// Convenience constructor for [`ManifestError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ManifestError {
    ManifestError::Io {
        path: path.into(),
        source,
    }
}
