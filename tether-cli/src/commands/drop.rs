//! `tether drop <name> [--dry-run]`

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use tether_core::{ManifestError, SourceName};

/// Remove a source from the manifest.
#[derive(Args, Debug)]
pub struct DropArgs {
    /// Name of the source to remove.
    pub name: String,

    /// Check that the source exists without saving.
    #[arg(long)]
    pub dry_run: bool,
}

impl DropArgs {
    pub fn run(self, path: &Path) -> Result<()> {
        let mut manifest = super::load_manifest(path)?;
        let name = SourceName::from(self.name);

        if !manifest.exists(&name) {
            return Err(ManifestError::NotFound { name }.into());
        }
        manifest.drop(&name);

        if !self.dry_run {
            manifest
                .save(path)
                .with_context(|| format!("failed to save '{}'", path.display()))?;
        }

        let prefix = if self.dry_run { "[dry-run] " } else { "" };
        println!("{prefix}✓ Dropped '{name}'");
        Ok(())
    }
}
