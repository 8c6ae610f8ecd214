//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Where versioned content comes from.
    pub catalog: CatalogConfig,

    /// Rebuild polling and catalog query bounds.
    pub rebuild: RebuildConfig,

    /// Whole-response cache sizing.
    pub cache: CacheConfig,

    /// Landing page contents.
    pub landing: LandingConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Which catalog implementation backs the version set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogMode {
    /// Versions are subdirectories of `versions_root`.
    Dir,
    /// Built-in sample content, no filesystem required.
    Demo,
}

/// Catalog configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub mode: CatalogMode,

    /// Directory whose immediate subdirectories are the served versions.
    pub versions_root: PathBuf,

    /// Directory served unversioned under /all/.
    pub latest_root: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            mode: CatalogMode::Dir,
            versions_root: PathBuf::from("content/versions"),
            latest_root: PathBuf::from("content/latest"),
        }
    }
}

/// Rebuild coordinator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RebuildConfig {
    /// Catalog poll interval in seconds (minimum 1).
    pub poll_interval_secs: u64,

    /// Upper bound on a single catalog listing query, in seconds.
    pub catalog_timeout_secs: u64,
}

impl Default for RebuildConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 300,
            catalog_timeout_secs: 30,
        }
    }
}

/// Whole-response cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cached responses.
    pub max_entries: u64,

    /// Entry time-to-live in seconds, uniform across all entries.
    pub ttl_secs: u64,

    /// Largest response body the cache will buffer; bigger bodies fail the
    /// request rather than stream uncached.
    pub max_body_bytes: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            ttl_secs: 3_600,
            max_body_bytes: 64 * 1024 * 1024,
        }
    }
}

/// Landing page configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LandingConfig {
    /// Page title.
    pub title: String,

    /// Optional link back to the source repository.
    pub source_url: Option<String>,
}

impl Default for LandingConfig {
    fn default() -> Self {
        Self {
            title: "Build artifacts".to_string(),
            source_url: None,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// How long a graceful shutdown may drain before the process exits.
    pub drain_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            drain_secs: 10,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Text,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log filter when RUST_LOG is unset (trace, debug, info, ...).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
