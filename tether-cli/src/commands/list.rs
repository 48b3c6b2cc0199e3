//! `tether list` — tabular view of the manifest.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use tether_core::{Manifest, Source};

/// Arguments for `tether list`.
#[derive(Args, Debug)]
pub struct ListArgs {}

#[derive(Tabled)]
struct SourceRow {
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "type")]
    kind: String,
    #[tabled(rename = "version")]
    version: String,
    #[tabled(rename = "flags")]
    flags: String,
    #[tabled(rename = "url")]
    url: String,
}

impl ListArgs {
    pub fn run(self, path: &Path) -> Result<()> {
        let manifest = super::load_manifest(path)?;
        if manifest.is_empty() {
            println!("No sources tracked.");
            println!("Run: tether add <name> <url> --type binary|git");
            return Ok(());
        }
        println!("{}", render_table(&manifest));
        Ok(())
    }
}

fn render_table(manifest: &Manifest) -> String {
    let rows: Vec<SourceRow> = manifest
        .sources
        .iter()
        .map(|(name, source)| SourceRow {
            name: name.0.clone(),
            kind: source.kind.to_string(),
            version: source.version.clone().unwrap_or_else(|| "-".to_owned()),
            flags: flags(source),
            url: source.url.clone(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

fn flags(source: &Source) -> String {
    match (source.pinned, source.force) {
        (true, _) => "pinned".yellow().to_string(),
        (_, true) => "forced".cyan().to_string(),
        _ => String::new(),
    }
}
