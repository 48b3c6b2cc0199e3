//! Content-hash fetching.
//!
//! The primary digest comes from `nix-prefetch-url`, optionally unpacking the
//! archive first; the encoded (SRI) form is derived from it with
//! `nix hash to-sri`.

use crate::command::{self, digest_line};
use crate::error::ToolError;

const PREFETCH_PROGRAM: &str = "nix-prefetch-url";
const NIX_PROGRAM: &str = "nix";

/// Computes verifiable content hashes of remote artifacts.
pub trait HashProvider {
    /// Primary sha256 digest of the artifact at `location`.
    fn fetch_hash(&self, location: &str, unpack: bool) -> Result<String, ToolError>;

    /// Alternate encoded representation of a primary digest.
    fn derive_encoded_hash(&self, hash: &str) -> Result<String, ToolError>;
}

/// [`HashProvider`] backed by the nix command-line tools.
#[derive(Debug, Clone, Copy, Default)]
pub struct NixPrefetch;

impl HashProvider for NixPrefetch {
    fn fetch_hash(&self, location: &str, unpack: bool) -> Result<String, ToolError> {
        let output = command::run(PREFETCH_PROGRAM, &prefetch_args(location, unpack))?;
        digest_line(PREFETCH_PROGRAM, &output)
    }

    fn derive_encoded_hash(&self, hash: &str) -> Result<String, ToolError> {
        let output = command::run(NIX_PROGRAM, &["hash", "to-sri", "--type", "sha256", hash])?;
        digest_line(NIX_PROGRAM, &output)
    }
}

fn prefetch_args(location: &str, unpack: bool) -> Vec<&str> {
    let mut args = Vec::with_capacity(4);
    if unpack {
        args.push("--unpack");
    }
    args.extend(["--type", "sha256", location]);
    args
}
