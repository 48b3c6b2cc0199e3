//! Error types for tether-update.

use std::process::ExitStatus;

use thiserror::Error;

use tether_core::{ManifestError, SourceName};

/// Failure of an external tool (content hashing or ref listing).
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("`{program}` not found on PATH: {source}")]
    NotFound {
        program: String,
        #[source]
        source: which::Error,
    },

    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    /// Output did not contain a digest on its second-to-last line.
    #[error("`{program}` produced malformed output ({lines} line(s))")]
    MalformedOutput { program: String, lines: usize },
}

/// Errors from resolving the latest tag of a git source.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("source is not a git repository")]
    NotGit,

    #[error("invalid repository URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid tag_predicate regex pattern '{pattern}': {source}")]
    InvalidSelector {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("no tag of {repository} matches {}", .selector.as_deref().unwrap_or("any pattern"))]
    NoMatchingTag {
        repository: String,
        selector: Option<String>,
    },

    #[error(transparent)]
    Tool(#[from] ToolError),
}

/// All errors that can arise from add/update operations.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("failed to resolve latest tag for '{name}': {source}")]
    Resolve {
        name: SourceName,
        #[source]
        source: ResolveError,
    },

    #[error("failed to fetch hash for '{name}': {source}")]
    Fetch {
        name: SourceName,
        #[source]
        source: ToolError,
    },

    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

/// Convenience constructor for [`UpdateError::Fetch`].
pub(crate) fn fetch_err(name: &SourceName, source: ToolError) -> UpdateError {
    UpdateError::Fetch {
        name: name.clone(),
        source,
    }
}
