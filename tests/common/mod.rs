//! Shared fixtures for integration tests.

use std::sync::Arc;

use tagserve::catalog::{FixedCatalog, MemoryStore, Version};
use tagserve::config::ServerConfig;

/// A version backed by an in-memory store.
pub fn version(name: &str, files: &[(&str, &str)]) -> Version {
    let mut store = MemoryStore::new().with_file("index.html", format!("<h1>{name}</h1>"));
    for (path, contents) in files {
        store = store.with_file(*path, contents.to_string());
    }
    Version::new(name, Arc::new(store))
}

/// A programmable catalog with an unversioned "latest" tree.
pub fn catalog(versions: Vec<Version>) -> Arc<FixedCatalog> {
    Arc::new(FixedCatalog::new(
        versions,
        Arc::new(MemoryStore::new().with_file("index.html", "latest build")),
    ))
}

/// Config suitable for tests: no metrics exporter, tight timeouts.
pub fn config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.observability.metrics_enabled = false;
    config.timeouts.request_secs = 5;
    config
}
