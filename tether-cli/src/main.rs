//! tether — pin external sources to verified versions and hashes.
//!
//! # Usage
//!
//! ```text
//! tether [--sources <path>] init [--schema <uri>] [--dry-run]
//! tether [--sources <path>] add <name> <url> --type binary|git [--version <v>] [--pin | --force]
//! tether [--sources <path>] drop <name> [--dry-run]
//! tether [--sources <path>] update [name] [--force-hashed] [--force-pinned]
//! tether [--sources <path>] list
//! ```

mod commands;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    add::AddArgs, drop::DropArgs, init::InitArgs, list::ListArgs, update::UpdateArgs,
};
use tether_core::SourceKind;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "tether",
    version,
    about = "Track external sources and keep their versions and hashes current",
    long_about = None,
)]
struct Cli {
    /// Path to the sources manifest.
    #[arg(long, global = true, value_name = "PATH", default_value = "./tether.json")]
    sources: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new, empty sources manifest.
    Init(InitArgs),

    /// Add a source and record its current hash.
    Add(AddArgs),

    /// Remove a source from the manifest.
    Drop(DropArgs),

    /// Refresh one or all sources.
    Update(UpdateArgs),

    /// Show every tracked source.
    List(ListArgs),
}

// ---------------------------------------------------------------------------
// Shared SourceKind argument — parsed from CLI strings, converts to core type
// ---------------------------------------------------------------------------

/// Thin wrapper so clap can parse `SourceKind` from CLI args.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceKindArg(pub SourceKind);

impl FromStr for SourceKindArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.to_ascii_lowercase()
            .parse::<SourceKind>()
            .map(Self)
            .map_err(|e| e.to_string())
    }
}

impl fmt::Display for SourceKindArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<SourceKindArg> for SourceKind {
    fn from(k: SourceKindArg) -> Self {
        k.0
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let path = cli.sources;
    match cli.command {
        Commands::Init(args) => args.run(&path),
        Commands::Add(args) => args.run(&path),
        Commands::Drop(args) => args.run(&path),
        Commands::Update(args) => args.run(&path),
        Commands::List(args) => args.run(&path),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
