//! Configuration loading and layering.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::{CatalogMode, LogFormat, ServerConfig};
use crate::config::validation::{validate, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Validation(ValidationErrors),
}

/// All semantic errors found in one validation pass.
#[derive(Debug)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

/// Command-line overrides, applied after file and environment.
#[derive(Debug, Default)]
pub struct Overrides {
    pub listen: Option<String>,
    pub content_root: Option<PathBuf>,
    pub demo: bool,
}

/// Load configuration: optional TOML file, then environment variables,
/// then CLI overrides, then semantic validation.
pub fn load(path: Option<&Path>, overrides: Overrides) -> Result<ServerConfig, ConfigError> {
    let mut config = match path {
        Some(p) => {
            let content = std::fs::read_to_string(p).map_err(|source| ConfigError::Io {
                path: p.to_path_buf(),
                source,
            })?;
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: p.to_path_buf(),
                source,
            })?
        }
        None => ServerConfig::default(),
    };

    apply_env(&mut config, |key| std::env::var(key).ok());
    apply_overrides(&mut config, overrides);

    validate(&config).map_err(|errors| ConfigError::Validation(ValidationErrors(errors)))?;
    Ok(config)
}

fn apply_env(config: &mut ServerConfig, getenv: impl Fn(&str) -> Option<String>) {
    if let Some(port) = getenv("PORT") {
        config.listener.bind_address = normalize_listen_address(&port);
    }
    if let Some(addr) = getenv("TAGSERVE_LISTEN_ADDRESS") {
        config.listener.bind_address = normalize_listen_address(&addr);
    }
    if let Some(root) = getenv("TAGSERVE_CONTENT_ROOT") {
        set_content_root(config, Path::new(&root));
    }
    if let Some(format) = getenv("TAGSERVE_LOG_FORMAT") {
        config.observability.log_format = match format.to_ascii_lowercase().as_str() {
            "text" => LogFormat::Text,
            _ => LogFormat::Json,
        };
    }
    if let Some(interval) = getenv("TAGSERVE_POLL_INTERVAL") {
        // Unparseable values keep the configured interval.
        if let Ok(secs) = interval.parse::<u64>() {
            config.rebuild.poll_interval_secs = secs;
        }
    }
    if let Some(title) = getenv("TAGSERVE_TITLE") {
        config.landing.title = title;
    }
    if getenv("TAGSERVE_DEMO").as_deref() == Some("true") {
        config.catalog.mode = CatalogMode::Demo;
    }
}

fn apply_overrides(config: &mut ServerConfig, overrides: Overrides) {
    if let Some(listen) = overrides.listen {
        config.listener.bind_address = normalize_listen_address(&listen);
    }
    if let Some(root) = overrides.content_root {
        set_content_root(config, &root);
    }
    if overrides.demo {
        config.catalog.mode = CatalogMode::Demo;
    }
}

fn set_content_root(config: &mut ServerConfig, root: &Path) {
    config.catalog.versions_root = root.join("versions");
    config.catalog.latest_root = root.join("latest");
}

/// Accepts a full socket address, a ":port" suffix, or a bare port.
fn normalize_listen_address(raw: &str) -> String {
    if raw.parse::<u16>().is_ok() {
        return format!("0.0.0.0:{raw}");
    }
    if let Some(port) = raw.strip_prefix(':') {
        if port.parse::<u16>().is_ok() {
            return format!("0.0.0.0:{port}");
        }
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + '_ {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn normalizes_port_forms() {
        assert_eq!(normalize_listen_address("9090"), "0.0.0.0:9090");
        assert_eq!(normalize_listen_address(":9090"), "0.0.0.0:9090");
        assert_eq!(normalize_listen_address("127.0.0.1:9090"), "127.0.0.1:9090");
    }

    #[test]
    fn env_overrides_defaults() {
        let mut config = ServerConfig::default();
        apply_env(
            &mut config,
            env_of(&[
                ("PORT", "9000"),
                ("TAGSERVE_LOG_FORMAT", "text"),
                ("TAGSERVE_POLL_INTERVAL", "60"),
                ("TAGSERVE_DEMO", "true"),
                ("TAGSERVE_CONTENT_ROOT", "/srv/artifacts"),
            ]),
        );
        assert_eq!(config.listener.bind_address, "0.0.0.0:9000");
        assert_eq!(config.observability.log_format, LogFormat::Text);
        assert_eq!(config.rebuild.poll_interval_secs, 60);
        assert_eq!(config.catalog.mode, CatalogMode::Demo);
        assert_eq!(
            config.catalog.versions_root,
            PathBuf::from("/srv/artifacts/versions")
        );
    }

    #[test]
    fn listen_address_beats_port() {
        let mut config = ServerConfig::default();
        apply_env(
            &mut config,
            env_of(&[
                ("PORT", "9000"),
                ("TAGSERVE_LISTEN_ADDRESS", "127.0.0.1:8088"),
            ]),
        );
        assert_eq!(config.listener.bind_address, "127.0.0.1:8088");
    }

    #[test]
    fn bad_poll_interval_keeps_configured_value() {
        let mut config = ServerConfig::default();
        apply_env(&mut config, env_of(&[("TAGSERVE_POLL_INTERVAL", "5m")]));
        assert_eq!(config.rebuild.poll_interval_secs, 300);
    }

    #[test]
    fn cli_overrides_win() {
        let mut config = ServerConfig::default();
        apply_overrides(
            &mut config,
            Overrides {
                listen: Some("8123".to_string()),
                content_root: None,
                demo: true,
            },
        );
        assert_eq!(config.listener.bind_address, "0.0.0.0:8123");
        assert_eq!(config.catalog.mode, CatalogMode::Demo);
    }
}
