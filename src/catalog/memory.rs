//! In-memory catalog and stores.
//!
//! Backs the built-in demo mode and doubles as the test seam for the
//! rebuild coordinator: the version list can be swapped and listing
//! failures injected at runtime.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;

use crate::catalog::{CatalogError, ContentStore, StoreError, Version, VersionCatalog};

/// A content store held entirely in memory.
#[derive(Default)]
pub struct MemoryStore {
    files: HashMap<String, Bytes>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file at `path` (no leading slash).
    pub fn with_file(mut self, path: impl Into<String>, contents: impl Into<Bytes>) -> Self {
        self.files.insert(path.into(), contents.into());
        self
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn read(&self, path: &str) -> Result<Bytes, StoreError> {
        self.files.get(path).cloned().ok_or(StoreError::NotFound)
    }
}

/// A catalog over a programmable, in-memory version list.
pub struct FixedCatalog {
    versions: Mutex<Vec<Version>>,
    unversioned: Arc<dyn ContentStore>,
    fail_listing: AtomicBool,
}

impl FixedCatalog {
    pub fn new(versions: Vec<Version>, unversioned: Arc<dyn ContentStore>) -> Self {
        Self {
            versions: Mutex::new(versions),
            unversioned,
            fail_listing: AtomicBool::new(false),
        }
    }

    /// Replace the version list; the next listing reflects it.
    pub fn set_versions(&self, versions: Vec<Version>) {
        *self.versions.lock().unwrap() = versions;
    }

    /// Make subsequent listings fail (transient-outage simulation).
    pub fn set_failing(&self, failing: bool) {
        self.fail_listing.store(failing, Ordering::SeqCst);
    }

    /// Built-in sample content, served without any filesystem or remote.
    pub fn demo() -> Self {
        let page = |name: &str| {
            format!(
                "<!DOCTYPE html><html><body><h1>{name}</h1>\
                 <p>Sample build report for {name}.</p></body></html>"
            )
        };
        let version = |name: &str| {
            Version::new(
                name,
                Arc::new(
                    MemoryStore::new()
                        .with_file("index.html", page(name))
                        .with_file("report.txt", format!("report for {name}\n")),
                ),
            )
        };
        Self::new(
            vec![version("demo/1.0.0"), version("demo/1.1.0")],
            Arc::new(MemoryStore::new().with_file("index.html", page("latest"))),
        )
    }
}

#[async_trait]
impl VersionCatalog for FixedCatalog {
    async fn list_versions(&self) -> Result<Vec<Version>, CatalogError> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(CatalogError::Unavailable("listing disabled".to_string()));
        }
        let mut versions = self.versions.lock().unwrap().clone();
        versions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(versions)
    }

    fn unversioned(&self) -> Arc<dyn ContentStore> {
        self.unversioned.clone()
    }
}
