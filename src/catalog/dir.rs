//! Filesystem-backed catalog and stores.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::catalog::{CatalogError, ContentStore, StoreError, Version, VersionCatalog};

/// A local directory tree served as a content store.
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ContentStore for DirStore {
    async fn read(&self, path: &str) -> Result<Bytes, StoreError> {
        let mut full = self.root.clone();
        for segment in path.split('/') {
            // Dot segments never resolve; the route layer rejects them
            // too, this keeps the store safe on its own.
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(StoreError::NotFound);
            }
            full.push(segment);
        }

        if let Ok(meta) = tokio::fs::metadata(&full).await {
            if meta.is_dir() {
                full.push("index.html");
            }
        }

        match tokio::fs::read(&full).await {
            Ok(body) => Ok(Bytes::from(body)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(StoreError::NotFound),
            Err(err) => Err(err.into()),
        }
    }
}

/// Catalog whose versions are the immediate subdirectories of a root.
///
/// A new tag shows up by a new subdirectory materialising between polls;
/// the unversioned tree lives in a sibling directory.
pub struct DirCatalog {
    versions_root: PathBuf,
    latest: Arc<DirStore>,
}

impl DirCatalog {
    pub fn new(versions_root: impl Into<PathBuf>, latest_root: impl AsRef<Path>) -> Self {
        Self {
            versions_root: versions_root.into(),
            latest: Arc::new(DirStore::new(latest_root.as_ref())),
        }
    }
}

#[async_trait]
impl VersionCatalog for DirCatalog {
    async fn list_versions(&self) -> Result<Vec<Version>, CatalogError> {
        let mut entries = tokio::fs::read_dir(&self.versions_root).await?;
        let mut versions = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    tracing::debug!(name = ?raw, "skipped non-unicode version directory");
                    continue;
                }
            };
            if name.starts_with('.') {
                tracing::debug!(name = %name, "skipped hidden version directory");
                continue;
            }
            versions.push(Version::new(name, Arc::new(DirStore::new(entry.path()))));
        }
        versions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(versions)
    }

    fn unversioned(&self) -> Arc<dyn ContentStore> {
        self.latest.clone()
    }
}
