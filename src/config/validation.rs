//! Semantic configuration validation.
//!
//! Serde handles the syntactic layer; this pass checks value ranges and
//! reports every problem at once rather than stopping at the first.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServerConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a valid socket address")]
    BindAddress(String),

    #[error("rebuild.poll_interval_secs must be at least 1")]
    PollInterval,

    #[error("rebuild.catalog_timeout_secs must be greater than 0")]
    CatalogTimeout,

    #[error("cache.max_entries must be greater than 0")]
    CacheCapacity,

    #[error("cache.ttl_secs must be greater than 0")]
    CacheTtl,

    #[error("cache.max_body_bytes must be greater than 0")]
    CacheBodyLimit,

    #[error("timeouts.request_secs must be greater than 0")]
    RequestTimeout,

    #[error("observability.metrics_address {0:?} is not a valid socket address")]
    MetricsAddress(String),

    #[error("landing.title must not be empty")]
    Title,
}

/// Check value ranges across the whole config.
pub fn validate(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.rebuild.poll_interval_secs == 0 {
        errors.push(ValidationError::PollInterval);
    }
    if config.rebuild.catalog_timeout_secs == 0 {
        errors.push(ValidationError::CatalogTimeout);
    }
    if config.cache.max_entries == 0 {
        errors.push(ValidationError::CacheCapacity);
    }
    if config.cache.ttl_secs == 0 {
        errors.push(ValidationError::CacheTtl);
    }
    if config.cache.max_body_bytes == 0 {
        errors.push(ValidationError::CacheBodyLimit);
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::RequestTimeout);
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }
    if config.landing.title.trim().is_empty() {
        errors.push(ValidationError::Title);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
