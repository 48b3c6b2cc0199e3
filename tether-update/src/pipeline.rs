//! Reconciliation driver shared by `tether update` and its tests.
//!
//! Sources are refreshed one at a time, in name order. The first failure
//! aborts the run before anything is saved; otherwise the manifest is saved
//! once, and only if at least one source changed.

use std::path::Path;

use tether_core::{Manifest, ManifestError, SourceName};

use crate::hash::HashProvider;
use crate::source::{update_source, UpdateOptions};
use crate::tags::TagLister;
use crate::UpdateError;

/// Which sources a run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateScope {
    /// Every source in the manifest; unknown names cannot occur.
    All,
    /// One explicitly named source; fails with `NotFound` if absent.
    Source(SourceName),
}

/// Outcome of a reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Sources whose version or hash changed, in processing order.
    pub updated: Vec<SourceName>,
    /// Whether the manifest was written to disk.
    pub saved: bool,
}

/// Run the reconciliation driver over `scope` and persist the result to `path`.
pub fn run(
    manifest: &mut Manifest,
    path: &Path,
    scope: UpdateScope,
    options: UpdateOptions,
    dry_run: bool,
    tags: &impl TagLister,
    hasher: &impl HashProvider,
) -> Result<UpdateReport, UpdateError> {
    let names = match scope {
        UpdateScope::All => manifest.names(),
        UpdateScope::Source(name) => {
            if !manifest.exists(&name) {
                return Err(ManifestError::NotFound { name }.into());
            }
            vec![name]
        }
    };

    let mut report = UpdateReport::default();
    for name in names {
        if update_source(manifest, &name, options, tags, hasher)? {
            report.updated.push(name);
        }
    }

    if report.updated.is_empty() {
        tracing::info!("no sources changed");
    } else if dry_run {
        tracing::info!("[dry-run] would save {} updated source(s)", report.updated.len());
    } else {
        manifest.save(path)?;
        report.saved = true;
    }
    Ok(report)
}
