//! # tether-update
//!
//! Source reconciliation engine: resolves each source's latest tag and
//! content hash and records changes in the [`Manifest`](tether_core::Manifest).
//!
//! Call [`update_source`] to refresh one source, [`add_source`] to hash and
//! insert a new one, or [`pipeline::run`] to reconcile a whole manifest and
//! save it. External tools sit behind [`TagLister`] and [`HashProvider`].

mod command;
pub mod error;
pub mod hash;
pub mod pipeline;
pub mod source;
pub mod tags;

#[cfg(test)]
mod testing;

pub use error::{ResolveError, ToolError, UpdateError};
pub use hash::{HashProvider, NixPrefetch};
pub use pipeline::{UpdateReport, UpdateScope};
pub use source::{add_source, update_source, UpdateOptions};
pub use tags::{resolve_latest_tag, GitLsRemote, TagLister};
