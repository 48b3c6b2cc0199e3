//! Latest-tag resolution for git sources.
//!
//! Resolution steps:
//! 1. Canonicalize the source URL to `scheme://host/owner/repo`.
//! 2. List remote tags and reduce each ref to its final path component,
//!    dropping the peeled-tag marker `^{}`.
//! 3. Sort with version-aware ordering.
//! 4. Pick the highest tag, or the highest one matching `tag_predicate`.
//! 5. Strip `trim_tag_prefix` from the result.

use std::cmp::Ordering;

use regex::Regex;
use url::Url;

use tether_core::Source;

use crate::command;
use crate::error::{ResolveError, ToolError};

const GIT_PROGRAM: &str = "git";
const PEELED_MARKER: &str = "^{}";

/// Lists the refs advertised by a remote repository.
pub trait TagLister {
    /// Raw listing in `git ls-remote` form: one `<oid>\t<ref>` pair per line.
    fn list_refs(&self, repository: &str) -> Result<String, ToolError>;
}

/// [`TagLister`] backed by `git ls-remote --tags`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitLsRemote;

impl TagLister for GitLsRemote {
    fn list_refs(&self, repository: &str) -> Result<String, ToolError> {
        command::run(GIT_PROGRAM, &["ls-remote", "--tags", repository])
    }
}

/// Resolve the tag a git source should track.
pub fn resolve_latest_tag(
    source: &Source,
    lister: &impl TagLister,
) -> Result<String, ResolveError> {
    if !source.is_git() {
        return Err(ResolveError::NotGit);
    }

    let selector = match source.tag_predicate.as_deref().filter(|p| !p.is_empty()) {
        Some(pattern) => Some(Regex::new(pattern).map_err(|e| ResolveError::InvalidSelector {
            pattern: pattern.to_owned(),
            source: e,
        })?),
        None => None,
    };

    let repository = canonical_repository(&source.url)?;
    let listing = lister.list_refs(&repository)?;
    let tags = tag_names(&listing);

    let latest = match &selector {
        None => tags.last(),
        Some(pattern) => tags.iter().rev().find(|tag| pattern.is_match(tag)),
    }
    .ok_or_else(|| ResolveError::NoMatchingTag {
        repository: repository.clone(),
        selector: source.tag_predicate.clone(),
    })?;
    tracing::debug!(%repository, tag = %latest, candidates = tags.len(), "selected tag");

    let latest = latest.as_str();
    let trimmed = match source.trim_tag_prefix.as_deref() {
        Some(prefix) => latest.strip_prefix(prefix).unwrap_or(latest),
        None => latest,
    };
    Ok(trimmed.to_owned())
}

/// `scheme://host[:port]/owner/repo` for any URL pointing into a repository.
pub fn canonical_repository(raw: &str) -> Result<String, ResolveError> {
    let invalid = |reason: String| ResolveError::InvalidUrl {
        url: raw.to_owned(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    let host = url
        .host_str()
        .ok_or_else(|| invalid("missing host".to_owned()))?;
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).take(2).collect())
        .unwrap_or_default();
    let [owner, repo] = segments.as_slice() else {
        return Err(invalid("expected an /owner/repo path".to_owned()));
    };

    let port = url.port().map(|p| format!(":{p}")).unwrap_or_default();
    Ok(format!("{}://{host}{port}/{owner}/{repo}", url.scheme()))
}

/// Tag names from a ref listing, deduplicated and sorted ascending by
/// [`version_cmp`].
pub fn tag_names(listing: &str) -> Vec<String> {
    let mut tags: Vec<String> = listing
        .lines()
        .map(|line| line.rsplit('\t').next().unwrap_or(line))
        .map(|reference| reference.rsplit('/').next().unwrap_or(reference))
        .map(|name| name.strip_suffix(PEELED_MARKER).unwrap_or(name).trim())
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect();
    tags.sort_by(|a, b| version_cmp(a, b));
    tags.dedup();
    tags
}

/// Version-aware ("natural") ordering: digit runs compare by numeric value,
/// everything else byte-wise, so `v1.10.0` sorts after `v1.9.0`.
///
/// Strings that compare equal numerically (`v01` / `v1`) fall back to plain
/// byte order so the result is total.
pub fn version_cmp(a: &str, b: &str) -> Ordering {
    natural_cmp(a, b).then_with(|| a.cmp(b))
}

fn natural_cmp(mut a: &str, mut b: &str) -> Ordering {
    loop {
        match (a.is_empty(), b.is_empty()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {}
        }

        let (a_text, a_rest) = split_run(a, |c| !c.is_ascii_digit());
        let (b_text, b_rest) = split_run(b, |c| !c.is_ascii_digit());
        match a_text.cmp(b_text) {
            Ordering::Equal => {}
            other => return other,
        }

        let (a_num, a_rest) = split_run(a_rest, |c| c.is_ascii_digit());
        let (b_num, b_rest) = split_run(b_rest, |c| c.is_ascii_digit());
        match numeric_cmp(a_num, b_num) {
            Ordering::Equal => {}
            other => return other,
        }

        a = a_rest;
        b = b_rest;
    }
}

fn split_run(s: &str, keep: impl Fn(char) -> bool) -> (&str, &str) {
    let end = s.find(|c: char| !keep(c)).unwrap_or(s.len());
    s.split_at(end)
}

fn numeric_cmp(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
