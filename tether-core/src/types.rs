//! Domain types for the tether manifest.
//!
//! A [`Source`] is one tracked external dependency; its on-disk field names
//! are the manifest's wire format and must stay stable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ManifestError;

/// Placeholder substituted with the resolved version inside a URL template.
pub const VERSION_MARKER: &str = "{version}";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed manifest key identifying one source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceName(pub String);

impl fmt::Display for SourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for SourceName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SourceName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// How a source's latest content is discovered.
///
/// Manifests written before the `type` field existed only tracked plain
/// downloads, so a missing `type` loads as [`SourceKind::Binary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Binary,
    Git,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Binary => write!(f, "binary"),
            SourceKind::Git => write!(f, "git"),
        }
    }
}

impl FromStr for SourceKind {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "binary" => Ok(Self::Binary),
            "git" => Ok(Self::Git),
            other => Err(ManifestError::InvalidSourceType(other.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// One tracked dependency as persisted in the manifest.
///
/// `uri` / `uri_template` are accepted on load for manifests written by older
/// releases; saves always use `url` / `url_template`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Fixed URL, or the template with the current version substituted in.
    #[serde(alias = "uri")]
    pub url: String,
    #[serde(default)]
    pub sha256: String,
    /// Encoded (SRI) form of `sha256`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default)]
    pub unpack: bool,
    #[serde(rename = "type", default)]
    pub kind: SourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, alias = "uri_template", skip_serializing_if = "Option::is_none")]
    pub url_template: Option<String>,
    /// Regex selecting which remote tags are release candidates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_predicate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trim_tag_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub pinned: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub force: bool,
}

impl Source {
    pub fn is_git(&self) -> bool {
        self.kind == SourceKind::Git
    }

    /// Re-derive `url` from `url_template` and the current `version`.
    ///
    /// Returns `true` when the template carried the version marker and `url`
    /// was rewritten; sources without a template are left untouched.
    pub fn apply_template(&mut self) -> bool {
        let (Some(template), Some(version)) = (&self.url_template, &self.version) else {
            return false;
        };
        if !template.contains(VERSION_MARKER) {
            return false;
        }
        self.url = template.replace(VERSION_MARKER, version);
        true
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

// ---------------------------------------------------------------------------
// SourceSpec
// ---------------------------------------------------------------------------

/// User-supplied description of a new source, validated by [`SourceSpec::build`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceSpec {
    pub kind: SourceKind,
    /// Plain URL, or a URL template when `version` is set.
    pub location: String,
    pub version: Option<String>,
    pub tag_predicate: Option<String>,
    pub trim_tag_prefix: Option<String>,
    pub unpack: bool,
    pub pin: bool,
    pub force: bool,
}

impl SourceSpec {
    /// Validate the spec and produce an unhashed [`Source`].
    ///
    /// Fails with `ReservedName` for `$schema`. Tag options are dropped for
    /// binary sources. The template is kept only
    /// when it contains [`VERSION_MARKER`]; otherwise `location` is used as a
    /// plain URL.
    pub fn build(self, name: &SourceName) -> Result<Source, ManifestError> {
        crate::manifest::check_name(name)?;
        if self.pin && self.force {
            return Err(ManifestError::PinForceConflict { name: name.clone() });
        }
        let is_git = self.kind == SourceKind::Git;
        if self.version.is_some() && !is_git {
            return Err(ManifestError::VersionRequiresGit { name: name.clone() });
        }

        let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());
        let version = non_empty(self.version);
        let url_template = match &version {
            Some(_) if self.location.contains(VERSION_MARKER) => Some(self.location.clone()),
            _ => None,
        };

        let mut source = Source {
            url: self.location,
            sha256: String::new(),
            hash: None,
            unpack: self.unpack,
            kind: self.kind,
            version,
            url_template,
            tag_predicate: if is_git { non_empty(self.tag_predicate) } else { None },
            trim_tag_prefix: if is_git { non_empty(self.trim_tag_prefix) } else { None },
            pinned: self.pin,
            force: self.force,
        };
        source.apply_template();
        Ok(source)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
