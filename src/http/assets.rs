//! Compile-time-embedded UI assets, served under /static/.

use async_trait::async_trait;
use bytes::Bytes;

use crate::catalog::{ContentStore, StoreError};

static ASSETS: &[(&str, &[u8])] = &[("style.css", include_bytes!("../../resources/web/style.css"))];

/// Bundled stylesheet and friends; no filesystem at runtime.
pub struct EmbeddedAssets;

#[async_trait]
impl ContentStore for EmbeddedAssets {
    async fn read(&self, path: &str) -> Result<Bytes, StoreError> {
        ASSETS
            .iter()
            .find(|(name, _)| *name == path)
            .map(|(_, body)| Bytes::from_static(body))
            .ok_or(StoreError::NotFound)
    }
}
