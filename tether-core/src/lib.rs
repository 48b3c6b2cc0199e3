//! tether core library — domain types, manifest persistence, errors.
//!
//! - [`types`] — [`SourceName`], [`SourceKind`], [`Source`], [`SourceSpec`]
//! - [`error`] — [`ManifestError`]
//! - [`manifest`] — [`Manifest`] load / save / add / drop, and [`manifest::init`]

pub mod error;
pub mod manifest;
pub mod types;

pub use error::ManifestError;
pub use manifest::Manifest;
pub use types::{Source, SourceKind, SourceName, SourceSpec, VERSION_MARKER};
