//! Version catalog and content store abstractions.
//!
//! # Data Flow
//! ```text
//! rebuild coordinator
//!     → VersionCatalog::list_versions (ordered set of named snapshots)
//!     → route table builder (one route per version)
//!     → ContentStore::read on each request (read-only byte access)
//! ```
//!
//! # Design Decisions
//! - The remote tag/content provider stays behind these traits; the
//!   server never assumes more than "list names" and "read bytes"
//! - Catalog listing failures are transient: callers treat them as
//!   "no change", never as fatal
//! - Stores are immutable snapshots; a changed version set yields new
//!   store instances, not mutated ones

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub mod dir;
pub mod memory;

pub use dir::{DirCatalog, DirStore};
pub use memory::{FixedCatalog, MemoryStore};

/// Read error for a content store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Listing error for a version catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// A read-only hierarchical byte store.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Read the file at `path`. Paths are slash-separated and carry no
    /// leading slash; callers resolve directory-style requests to
    /// `index.html` before calling.
    async fn read(&self, path: &str) -> Result<Bytes, StoreError>;
}

/// One named, immutable content snapshot.
#[derive(Clone)]
pub struct Version {
    pub name: String,
    pub store: Arc<dyn ContentStore>,
}

impl Version {
    pub fn new(name: impl Into<String>, store: Arc<dyn ContentStore>) -> Self {
        Self {
            name: name.into(),
            store,
        }
    }
}

impl fmt::Debug for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Version").field("name", &self.name).finish()
    }
}

/// Source of truth for the set of served versions.
#[async_trait]
pub trait VersionCatalog: Send + Sync {
    /// Enumerate the known versions, sorted by name.
    async fn list_versions(&self) -> Result<Vec<Version>, CatalogError>;

    /// The unversioned ("latest") content tree.
    fn unversioned(&self) -> Arc<dyn ContentStore>;
}
