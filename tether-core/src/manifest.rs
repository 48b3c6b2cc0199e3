//! JSON manifest persistence.
//!
//! # On-disk layout
//!
//! ```text
//! {
//!   "$schema": "<optional URI>",
//!   "<name>": { "url": ..., "sha256": ..., "type": "binary" | "git", ... },
//!   ...
//! }
//! ```
//!
//! `$schema` lives beside the sources in the same JSON object but never in
//! [`Manifest::sources`]. Sources are kept in a `BTreeMap` so saves are
//! ordered by name and diff cleanly.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::{io_err, ManifestError};
use crate::types::{Source, SourceKind, SourceName};

/// Top-level key carrying the schema annotation.
pub const SCHEMA_KEY: &str = "$schema";

/// The full set of tracked sources plus the optional schema annotation.
///
/// Owned by a single command invocation: construct at command start, thread
/// through every engine call, save at most once.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Manifest {
    /// `$schema` URI; empty when the manifest has none.
    pub schema: String,
    pub sources: BTreeMap<SourceName, Source>,
}

impl Manifest {
    /// An empty manifest annotated with `schema` (pass `""` for none).
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            sources: BTreeMap::new(),
        }
    }

    // -----------------------------------------------------------------------
    // 1. Load
    // -----------------------------------------------------------------------

    /// Load the manifest at `path`.
    ///
    /// Returns `ManifestError::ManifestNotFound` if absent and
    /// `ManifestError::Parse` (with path) if the file is not a JSON object of
    /// sources. An unknown `type` is reported as `InvalidSourceType`.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(ManifestError::ManifestNotFound {
                    path: path.to_path_buf(),
                })
            }
            Err(err) => return Err(io_err(path, err)),
        };
        Self::from_json(path, &contents)
    }

    fn from_json(path: &Path, contents: &str) -> Result<Self, ManifestError> {
        let parse_err = |source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        };

        let mut raw: Map<String, Value> = serde_json::from_str(contents).map_err(parse_err)?;
        let schema = match raw.remove(SCHEMA_KEY) {
            None => String::new(),
            Some(Value::String(schema)) => schema,
            Some(_) => {
                return Err(ManifestError::InvalidSchemaRef {
                    path: path.to_path_buf(),
                })
            }
        };
        for entry in raw.values() {
            if let Some(Value::String(kind)) = entry.get("type") {
                kind.parse::<SourceKind>()?;
            }
        }
        let sources = serde_json::from_value(Value::Object(raw)).map_err(parse_err)?;
        Ok(Self { schema, sources })
    }

    // -----------------------------------------------------------------------
    // 2. Save (atomic)
    // -----------------------------------------------------------------------

    /// Atomically save the manifest to `path`.
    ///
    /// Write flow: resolve symlinks → encode → `<target>.tmp` sibling → copy
    /// the existing file's permissions → `rename`. The encoded object uses
    /// two-space indentation and ends with a newline.
    pub fn save(&self, path: &Path) -> Result<(), ManifestError> {
        let json = self.to_json()?;
        let target = resolve_target(path)?;
        let tmp = tmp_path(&target);
        std::fs::write(&tmp, json).map_err(|e| io_err(&tmp, e))?;
        match std::fs::metadata(&target) {
            Ok(meta) => {
                std::fs::set_permissions(&tmp, meta.permissions()).map_err(|e| io_err(&tmp, e))?
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(io_err(&target, err)),
        }
        std::fs::rename(&tmp, &target).map_err(|e| io_err(&target, e))?;
        tracing::debug!(path = %path.display(), sources = self.sources.len(), "saved manifest");
        Ok(())
    }

    /// Encode the manifest exactly as [`Manifest::save`] writes it.
    pub fn to_json(&self) -> Result<String, ManifestError> {
        let mut object = match serde_json::to_value(&self.sources)? {
            Value::Object(object) => object,
            _ => Map::new(),
        };
        if !self.schema.is_empty() {
            object.insert(SCHEMA_KEY.to_owned(), Value::String(self.schema.clone()));
        }
        let mut json = serde_json::to_string_pretty(&Value::Object(object))?;
        json.push('\n');
        Ok(json)
    }

    // -----------------------------------------------------------------------
    // 3. Entries
    // -----------------------------------------------------------------------

    pub fn exists(&self, name: &SourceName) -> bool {
        self.sources.contains_key(name)
    }

    pub fn get(&self, name: &SourceName) -> Option<&Source> {
        self.sources.get(name)
    }

    /// Insert a new source; fails with `DuplicateSource` if `name` is taken
    /// and `ReservedName` if it is [`SCHEMA_KEY`].
    pub fn add(&mut self, name: SourceName, source: Source) -> Result<(), ManifestError> {
        check_name(&name)?;
        if self.exists(&name) {
            return Err(ManifestError::DuplicateSource { name });
        }
        self.sources.insert(name, source);
        Ok(())
    }

    /// Remove `name` if present. Idempotent; callers that need a user-facing
    /// error check [`Manifest::exists`] first.
    pub fn drop(&mut self, name: &SourceName) -> Option<Source> {
        self.sources.remove(name)
    }

    /// Write back a (possibly mutated) source under an existing or new name.
    pub fn commit(&mut self, name: SourceName, source: Source) {
        self.sources.insert(name, source);
    }

    pub fn names(&self) -> Vec<SourceName> {
        self.sources.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

// ---------------------------------------------------------------------------
// 4. Init
// ---------------------------------------------------------------------------

/// Create an empty manifest at `path`.
///
/// Fails with `ManifestError::AlreadyExists` if a file is already there. With
/// `dry_run` the manifest is built and returned but nothing is written.
pub fn init(path: &Path, schema: Option<String>, dry_run: bool) -> Result<Manifest, ManifestError> {
    if path.exists() {
        return Err(ManifestError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }
    let manifest = Manifest::new(schema.unwrap_or_default());
    if !dry_run {
        manifest.save(path)?;
    }
    Ok(manifest)
}

/// Reject names that would collide with the `$schema` annotation on save.
pub(crate) fn check_name(name: &SourceName) -> Result<(), ManifestError> {
    if name.0 == SCHEMA_KEY {
        return Err(ManifestError::ReservedName { name: name.clone() });
    }
    Ok(())
}

/// Follow a symlinked manifest to the file it points at, so a save replaces
/// the target rather than the link.
fn resolve_target(path: &Path) -> Result<PathBuf, ManifestError> {
    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {
            std::fs::canonicalize(path).map_err(|e| io_err(path, e))
        }
        _ => Ok(path.to_path_buf()),
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
