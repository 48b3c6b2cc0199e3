pub mod add;
pub mod drop;
pub mod init;
pub mod list;
pub mod update;

use std::path::Path;

use anyhow::{Context, Result};
use tether_core::Manifest;

/// Load the manifest every command except `init` operates on.
pub(crate) fn load_manifest(path: &Path) -> Result<Manifest> {
    Manifest::load(path).with_context(|| {
        format!(
            "failed to load '{}' — run `tether init` first",
            path.display()
        )
    })
}
