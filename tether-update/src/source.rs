//! Per-source refresh.
//!
//! ## `update_source` gates, in order
//!
//! 1. Existence — unknown names are skipped, not an error.
//! 2. Pin — pinned sources are skipped unless `force_pinned`.
//! 3. Git refresh — resolve the latest tag. An unchanged tag without any
//!    force flag returns early: a fixed tag is assumed to have fixed content.
//! 4. Hash refresh — fetch the digest and its encoded form; adopt on change
//!    or `force_hash`.
//! 5. Commit — write the source back to the manifest.

use tether_core::{Manifest, SourceName, SourceSpec};

use crate::error::{fetch_err, UpdateError};
use crate::hash::HashProvider;
use crate::tags::{resolve_latest_tag, TagLister};

/// Caller-requested overrides for a refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Re-hash and record the result even if nothing appears to have changed.
    pub force_hash: bool,
    /// Refresh pinned sources too.
    pub force_pinned: bool,
}

/// Refresh `name` in place. Returns whether a stored version or hash changed.
pub fn update_source(
    manifest: &mut Manifest,
    name: &SourceName,
    options: UpdateOptions,
    tags: &impl TagLister,
    hasher: &impl HashProvider,
) -> Result<bool, UpdateError> {
    tracing::info!("checking {name}");

    let Some(mut source) = manifest.get(name).cloned() else {
        tracing::warn!("skipped {name}: source does not exist");
        return Ok(false);
    };

    if source.pinned && !options.force_pinned {
        tracing::info!("skipped {name}: source is pinned");
        return Ok(false);
    }

    let mut changed = false;

    if source.is_git() {
        tracing::debug!("checking {name}: remote git tag");
        let tag = resolve_latest_tag(&source, tags).map_err(|e| UpdateError::Resolve {
            name: name.clone(),
            source: e,
        })?;

        let bumped = source.version.as_deref() != Some(tag.as_str());
        if !bumped && !options.force_hash && !source.force {
            tracing::info!("skipped {name}: version remains unchanged");
            return Ok(false);
        }
        if bumped {
            tracing::info!(
                "bumped {name}: {} -> {tag}",
                source.version.as_deref().unwrap_or("<none>")
            );
            changed = true;
        }
        source.version = Some(tag);
        if source.apply_template() {
            tracing::debug!("patched {name}: substituted url template");
        }
    }

    tracing::debug!("checking {name}: sha256");
    let sha256 = hasher
        .fetch_hash(&source.url, source.unpack)
        .map_err(|e| fetch_err(name, e))?;
    let encoded = hasher
        .derive_encoded_hash(&sha256)
        .map_err(|e| fetch_err(name, e))?;

    if sha256 != source.sha256
        || source.hash.as_deref() != Some(encoded.as_str())
        || options.force_hash
    {
        tracing::info!("rehashed {name}: {} -> {sha256}", source.sha256);
        source.sha256 = sha256;
        source.hash = Some(encoded);
        changed = true;
    }

    manifest.commit(name.clone(), source);
    Ok(changed)
}

/// Build a source from `spec`, hash it, and insert it under `name`.
///
/// Validation (duplicate name, pin/force conflict) happens before any fetch,
/// so a rejected spec never touches the network or the manifest.
pub fn add_source(
    manifest: &mut Manifest,
    name: SourceName,
    spec: SourceSpec,
    hasher: &impl HashProvider,
) -> Result<(), UpdateError> {
    if manifest.exists(&name) {
        return Err(tether_core::ManifestError::DuplicateSource { name }.into());
    }
    let mut source = spec.build(&name)?;

    source.sha256 = hasher
        .fetch_hash(&source.url, source.unpack)
        .map_err(|e| fetch_err(&name, e))?;
    source.hash = Some(
        hasher
            .derive_encoded_hash(&source.sha256)
            .map_err(|e| fetch_err(&name, e))?,
    );

    tracing::info!("added {name}: {}", source.url);
    manifest.add(name, source)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeHasher, FakeTags};
    use tether_core::{ManifestError, Source, SourceKind};

    const TEMPLATE: &str = "https://github.com/owner/repo/archive/{version}.tar.gz";

    fn git(version: &str) -> Source {
        Source {
            url: TEMPLATE.replace("{version}", version),
            sha256: "old".to_owned(),
            hash: Some("sha256-old=".to_owned()),
            unpack: true,
            kind: SourceKind::Git,
            version: Some(version.to_owned()),
            url_template: Some(TEMPLATE.to_owned()),
            tag_predicate: None,
            trim_tag_prefix: None,
            pinned: false,
            force: false,
        }
    }

    fn binary() -> Source {
        Source {
            url: "https://example.com/tool.tar.gz".to_owned(),
            kind: SourceKind::Binary,
            version: None,
            url_template: None,
            ..git("v1.0.0")
        }
    }

    fn manifest_with(name: &str, source: Source) -> (Manifest, SourceName) {
        let mut manifest = Manifest::default();
        let name = SourceName::from(name);
        manifest.add(name.clone(), source).unwrap();
        (manifest, name)
    }

    #[test]
    fn missing_source_is_soft_skip() {
        let mut manifest = Manifest::default();
        let hasher = FakeHasher::new("new");
        let changed = update_source(
            &mut manifest,
            &SourceName::from("ghost"),
            UpdateOptions::default(),
            &FakeTags::new(&["v1"]),
            &hasher,
        )
        .unwrap();
        assert!(!changed);
        assert!(manifest.is_empty());
        assert_eq!(hasher.calls(), 0);
    }

    #[test]
    fn pinned_source_is_untouched() {
        let mut source = git("v1.0.0");
        source.pinned = true;
        let (mut manifest, name) = manifest_with("repo", source.clone());
        let tags = FakeTags::new(&["v2.0.0"]);
        let hasher = FakeHasher::new("new");

        let options = UpdateOptions {
            force_hash: true,
            force_pinned: false,
        };
        let changed = update_source(&mut manifest, &name, options, &tags, &hasher).unwrap();

        assert!(!changed);
        assert_eq!(manifest.get(&name), Some(&source));
        assert_eq!(tags.calls.get(), 0);
        assert_eq!(hasher.calls(), 0);
    }

    #[test]
    fn force_pinned_refreshes_pinned_source() {
        let mut source = git("v1.0.0");
        source.pinned = true;
        let (mut manifest, name) = manifest_with("repo", source);
        let options = UpdateOptions {
            force_hash: false,
            force_pinned: true,
        };
        let changed = update_source(
            &mut manifest,
            &name,
            options,
            &FakeTags::new(&["v2.0.0"]),
            &FakeHasher::new("new"),
        )
        .unwrap();

        assert!(changed);
        let updated = manifest.get(&name).unwrap();
        assert_eq!(updated.version.as_deref(), Some("v2.0.0"));
        assert!(updated.pinned, "pin survives a forced refresh");
    }

    #[test]
    fn unchanged_git_version_skips_hashing() {
        let source = git("v1.0.0");
        let (mut manifest, name) = manifest_with("repo", source.clone());
        let hasher = FakeHasher::new("new");

        let changed = update_source(
            &mut manifest,
            &name,
            UpdateOptions::default(),
            &FakeTags::new(&["v0.9.0", "v1.0.0"]),
            &hasher,
        )
        .unwrap();

        assert!(!changed);
        assert_eq!(hasher.calls(), 0, "hash fetch must not run");
        assert_eq!(manifest.get(&name), Some(&source));
    }

    #[test]
    fn new_tag_bumps_version_url_and_hash() {
        let (mut manifest, name) = manifest_with("repo", git("v1.0.0"));
        let hasher = FakeHasher::new("new");

        let changed = update_source(
            &mut manifest,
            &name,
            UpdateOptions::default(),
            &FakeTags::new(&["v1.0.0", "v1.1.0"]),
            &hasher,
        )
        .unwrap();

        assert!(changed);
        let updated = manifest.get(&name).unwrap();
        assert_eq!(updated.version.as_deref(), Some("v1.1.0"));
        assert_eq!(
            updated.url,
            "https://github.com/owner/repo/archive/v1.1.0.tar.gz"
        );
        assert_eq!(updated.sha256, "new");
        assert_eq!(updated.hash.as_deref(), Some("sha256-new="));
        assert_eq!(
            hasher.fetched.borrow()[0],
            (updated.url.clone(), true),
            "hash is fetched from the re-derived url with unpack"
        );
    }

    #[test]
    fn forced_source_rehashes_on_unchanged_tag() {
        let mut source = git("v1.0.0");
        source.force = true;
        let (mut manifest, name) = manifest_with("repo", source);
        let hasher = FakeHasher::new("new");

        let changed = update_source(
            &mut manifest,
            &name,
            UpdateOptions::default(),
            &FakeTags::new(&["v1.0.0"]),
            &hasher,
        )
        .unwrap();

        assert!(changed, "content behind the tag changed");
        assert_eq!(hasher.calls(), 1);
        assert_eq!(manifest.get(&name).unwrap().sha256, "new");
    }

    #[test]
    fn forced_source_with_identical_hash_reports_no_change() {
        let mut source = git("v1.0.0");
        source.force = true;
        source.sha256 = "same".to_owned();
        source.hash = Some("sha256-same=".to_owned());
        let (mut manifest, name) = manifest_with("repo", source);

        let changed = update_source(
            &mut manifest,
            &name,
            UpdateOptions::default(),
            &FakeTags::new(&["v1.0.0"]),
            &FakeHasher::new("same"),
        )
        .unwrap();
        assert!(!changed);
    }

    #[test]
    fn force_hash_always_reports_change() {
        let mut source = binary();
        source.sha256 = "same".to_owned();
        source.hash = Some("sha256-same=".to_owned());
        let (mut manifest, name) = manifest_with("tool", source);
        let options = UpdateOptions {
            force_hash: true,
            force_pinned: false,
        };

        let changed = update_source(
            &mut manifest,
            &name,
            options,
            &FakeTags::new(&[]),
            &FakeHasher::new("same"),
        )
        .unwrap();
        assert!(changed);
    }

    #[test]
    fn binary_source_skips_tag_resolution() {
        let (mut manifest, name) = manifest_with("tool", binary());
        let tags = FakeTags::new(&["v9.9.9"]);

        let changed = update_source(
            &mut manifest,
            &name,
            UpdateOptions::default(),
            &tags,
            &FakeHasher::new("new"),
        )
        .unwrap();

        assert!(changed);
        assert_eq!(tags.calls.get(), 0);
        assert_eq!(manifest.get(&name).unwrap().version, None);
    }

    #[test]
    fn missing_encoded_hash_is_filled_in() {
        let mut source = binary();
        source.sha256 = "same".to_owned();
        source.hash = None;
        let (mut manifest, name) = manifest_with("tool", source);

        let changed = update_source(
            &mut manifest,
            &name,
            UpdateOptions::default(),
            &FakeTags::new(&[]),
            &FakeHasher::new("same"),
        )
        .unwrap();
        assert!(changed);
        assert_eq!(
            manifest.get(&name).unwrap().hash.as_deref(),
            Some("sha256-same=")
        );
    }

    #[test]
    fn resolve_failure_names_the_source() {
        let mut source = git("v1.0.0");
        source.url = "https://github.com/owner".to_owned();
        source.url_template = None;
        let (mut manifest, name) = manifest_with("repo", source);

        let err = update_source(
            &mut manifest,
            &name,
            UpdateOptions::default(),
            &FakeTags::new(&["v1"]),
            &FakeHasher::new("new"),
        )
        .unwrap_err();
        assert!(matches!(err, UpdateError::Resolve { ref name, .. } if name.0 == "repo"));
        assert!(err.to_string().contains("repo"));
    }

    #[test]
    fn add_source_hashes_and_inserts() {
        let mut manifest = Manifest::default();
        let spec = SourceSpec {
            kind: SourceKind::Git,
            location: TEMPLATE.to_owned(),
            version: Some("v1.0.0".to_owned()),
            unpack: true,
            ..SourceSpec::default()
        };
        add_source(
            &mut manifest,
            SourceName::from("repo"),
            spec,
            &FakeHasher::new("abc"),
        )
        .unwrap();

        let added = manifest.get(&SourceName::from("repo")).unwrap();
        assert_eq!(added.sha256, "abc");
        assert_eq!(added.hash.as_deref(), Some("sha256-abc="));
        assert_eq!(added.url, "https://github.com/owner/repo/archive/v1.0.0.tar.gz");
    }

    #[test]
    fn add_pin_force_conflict_adds_nothing_and_fetches_nothing() {
        let mut manifest = Manifest::default();
        let hasher = FakeHasher::new("abc");
        let spec = SourceSpec {
            location: "https://example.com/a".to_owned(),
            pin: true,
            force: true,
            ..SourceSpec::default()
        };
        let err = add_source(&mut manifest, SourceName::from("a"), spec, &hasher).unwrap_err();

        assert!(matches!(
            err,
            UpdateError::Manifest(ManifestError::PinForceConflict { .. })
        ));
        assert!(manifest.is_empty());
        assert_eq!(hasher.calls(), 0);
    }

    #[test]
    fn add_duplicate_fails_before_fetch() {
        let (mut manifest, name) = manifest_with("tool", binary());
        let hasher = FakeHasher::new("abc");
        let spec = SourceSpec {
            location: "https://example.com/other".to_owned(),
            ..SourceSpec::default()
        };
        let err = add_source(&mut manifest, name, spec, &hasher).unwrap_err();
        assert!(matches!(
            err,
            UpdateError::Manifest(ManifestError::DuplicateSource { .. })
        ));
        assert_eq!(hasher.calls(), 0);
    }

    #[test]
    fn add_schema_key_fails_before_fetch() {
        let mut manifest = Manifest::default();
        let hasher = FakeHasher::new("abc");
        let spec = SourceSpec {
            location: "https://example.com/tool".to_owned(),
            ..SourceSpec::default()
        };
        let err = add_source(&mut manifest, SourceName::from("$schema"), spec, &hasher)
            .unwrap_err();
        assert!(matches!(
            err,
            UpdateError::Manifest(ManifestError::ReservedName { .. })
        ));
        assert_eq!(hasher.calls(), 0);
        assert!(manifest.is_empty());
    }
}
