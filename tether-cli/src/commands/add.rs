//! `tether add <name> <url> --type binary|git [...]`

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use tether_core::{SourceName, SourceSpec};
use tether_update::{add_source, NixPrefetch};

use super::super::SourceKindArg;

/// Add a source and record its current hash.
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Manifest key for the new source.
    pub name: String,

    /// Source URL, or a URL template containing `{version}` when `--version` is set.
    pub url: String,

    /// Source type: binary | git.
    #[arg(long = "type", short = 't', value_name = "TYPE")]
    pub kind: SourceKindArg,

    /// Initial version substituted into the URL template (git sources only).
    #[arg(long)]
    pub version: Option<String>,

    /// Regex selecting which remote tags count as releases (git sources only).
    #[arg(long, value_name = "REGEX")]
    pub tag_predicate: Option<String>,

    /// Literal prefix stripped from resolved tags before storing the version.
    #[arg(long, value_name = "PREFIX")]
    pub trim_tag_prefix: Option<String>,

    /// Hash the artifact as downloaded instead of unpacking it first.
    #[arg(long)]
    pub no_unpack: bool,

    /// Exclude the source from updates unless `--force-pinned` is given.
    #[arg(long)]
    pub pin: bool,

    /// Always re-hash the source on update.
    #[arg(long)]
    pub force: bool,

    /// Fetch and validate without saving.
    #[arg(long)]
    pub dry_run: bool,
}

impl AddArgs {
    pub fn run(self, path: &Path) -> Result<()> {
        let mut manifest = super::load_manifest(path)?;
        let name = SourceName::from(self.name);
        let spec = SourceSpec {
            kind: self.kind.into(),
            location: self.url,
            version: self.version,
            tag_predicate: self.tag_predicate,
            trim_tag_prefix: self.trim_tag_prefix,
            unpack: !self.no_unpack,
            pin: self.pin,
            force: self.force,
        };

        add_source(&mut manifest, name.clone(), spec, &NixPrefetch)
            .with_context(|| format!("failed to add '{name}'"))?;
        if !self.dry_run {
            manifest
                .save(path)
                .with_context(|| format!("failed to save '{}'", path.display()))?;
        }

        let prefix = if self.dry_run { "[dry-run] " } else { "" };
        println!("{prefix}✓ Added '{name}'");
        Ok(())
    }
}
