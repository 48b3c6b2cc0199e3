//! `tether update` — refresh versions and hashes of one or all sources.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use tether_core::SourceName;
use tether_update::{
    pipeline::{self, UpdateScope},
    GitLsRemote, NixPrefetch, UpdateOptions,
};

/// Arguments for `tether update`.
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Name of the source to update (omit to update every source).
    pub name: Option<String>,

    /// Re-hash sources even when their version is unchanged.
    #[arg(long)]
    pub force_hashed: bool,

    /// Update pinned sources too.
    #[arg(long)]
    pub force_pinned: bool,

    /// Print the names of updated sources, one per line.
    #[arg(long, conflicts_with = "output_formatted_updated_list")]
    pub output_updated_list: bool,

    /// Print the names of updated sources as a single sentence-style list.
    #[arg(long)]
    pub output_formatted_updated_list: bool,

    /// Resolve and hash without saving.
    #[arg(long)]
    pub dry_run: bool,
}

impl UpdateArgs {
    pub fn run(self, path: &Path) -> Result<()> {
        let mut manifest = super::load_manifest(path)?;
        let scope = match self.name {
            Some(name) => UpdateScope::Source(SourceName::from(name)),
            None => UpdateScope::All,
        };
        let options = UpdateOptions {
            force_hash: self.force_hashed,
            force_pinned: self.force_pinned,
        };

        let report = pipeline::run(
            &mut manifest,
            path,
            scope,
            options,
            self.dry_run,
            &GitLsRemote,
            &NixPrefetch,
        )
        .context("update failed")?;

        let names: Vec<String> = report.updated.iter().map(|n| n.0.clone()).collect();
        if self.output_updated_list {
            for name in &names {
                println!("{name}");
            }
        } else if self.output_formatted_updated_list {
            println!("{}", format_list(&names));
        }
        Ok(())
    }
}

/// Join names as `a`, `a & b`, or `a, b, & c`.
fn format_list(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{first} & {second}"),
        [init @ .., last] => format!("{}, & {last}", init.join(", ")),
    }
}
