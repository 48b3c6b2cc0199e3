//! `tether init [--schema <uri>] [--dry-run]`

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use tether_core::manifest;

/// Create a new, empty sources manifest.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// `$schema` URI recorded at the top of the manifest.
    #[arg(long, value_name = "URI")]
    pub schema: Option<String>,

    /// Check that the manifest can be created without writing it.
    #[arg(long)]
    pub dry_run: bool,
}

impl InitArgs {
    pub fn run(self, path: &Path) -> Result<()> {
        manifest::init(path, self.schema, self.dry_run)
            .with_context(|| format!("failed to init '{}'", path.display()))?;

        let prefix = if self.dry_run { "[dry-run] " } else { "" };
        println!("{prefix}✓ Initialized '{}'", path.display());
        Ok(())
    }
}
