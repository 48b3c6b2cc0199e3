//! Canned [`TagLister`] / [`HashProvider`] implementations for unit tests.

use std::cell::{Cell, RefCell};

use crate::error::ToolError;
use crate::hash::HashProvider;
use crate::tags::TagLister;

/// Returns the same ref listing for every repository and counts calls.
pub(crate) struct FakeTags {
    pub listing: String,
    pub calls: Cell<usize>,
}

impl FakeTags {
    pub fn new(tags: &[&str]) -> Self {
        let listing = tags
            .iter()
            .enumerate()
            .map(|(i, tag)| format!("{i:040}\trefs/tags/{tag}\n"))
            .collect();
        Self {
            listing,
            calls: Cell::new(0),
        }
    }
}

impl TagLister for FakeTags {
    fn list_refs(&self, _repository: &str) -> Result<String, ToolError> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.listing.clone())
    }
}

/// Hashes every location to `digest`, or fails for `fail_on` locations.
pub(crate) struct FakeHasher {
    pub digest: String,
    pub fail_on: Option<String>,
    pub fetched: RefCell<Vec<(String, bool)>>,
}

impl FakeHasher {
    pub fn new(digest: &str) -> Self {
        Self {
            digest: digest.to_owned(),
            fail_on: None,
            fetched: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.fetched.borrow().len()
    }
}

impl HashProvider for FakeHasher {
    fn fetch_hash(&self, location: &str, unpack: bool) -> Result<String, ToolError> {
        self.fetched.borrow_mut().push((location.to_owned(), unpack));
        if self.fail_on.as_deref() == Some(location) {
            return Err(ToolError::MalformedOutput {
                program: "fake-prefetch".to_owned(),
                lines: 1,
            });
        }
        Ok(self.digest.clone())
    }

    fn derive_encoded_hash(&self, hash: &str) -> Result<String, ToolError> {
        Ok(format!("sha256-{hash}="))
    }
}
