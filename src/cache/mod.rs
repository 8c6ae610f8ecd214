//! Whole-response caching.
//!
//! # Responsibilities
//! - Serve repeat requests from memory without touching the route set
//! - Capture complete responses before anything reaches the client
//! - Enforce the entry TTL and the capacity bound
//!
//! # Design Decisions
//! - Keys are the full request target, query string included: cache-bust
//!   params defeat the cache, distinct representations never collide
//! - Only 2xx responses are stored
//! - Two concurrent misses for one key may both run the inner handler;
//!   the last insert wins. Accepted tradeoff, do not strengthen
//! - A body that cannot be buffered to completion answers 500 and is
//!   never stored

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use moka::future::Cache;

use crate::observability::metrics;

/// One captured response, replayed verbatim on hits.
#[derive(Debug)]
pub struct CachedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl CachedResponse {
    fn to_response(&self) -> Response {
        let mut response = Response::new(Body::from(self.body.clone()));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers.clone();
        response
    }
}

/// TTL- and capacity-bounded response cache.
///
/// Entries expire `ttl` after insertion, uniformly; the capacity bound is
/// enforced by moka's recency/frequency-aware eviction.
#[derive(Clone)]
pub struct ResponseCache {
    entries: Cache<String, Arc<CachedResponse>>,
    max_body_bytes: usize,
}

impl ResponseCache {
    pub fn new(max_entries: u64, ttl: Duration, max_body_bytes: usize) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();
        Self {
            entries,
            max_body_bytes,
        }
    }

    /// Resident entry count. Call [`ResponseCache::flush`] first for a
    /// value that reflects pending evictions.
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Run pending cache maintenance (eviction, expiry bookkeeping).
    pub async fn flush(&self) {
        self.entries.run_pending_tasks().await;
    }
}

/// Middleware entry point: serve from cache or capture the inner response.
pub async fn handle(State(cache): State<ResponseCache>, request: Request, next: Next) -> Response {
    let key = request.uri().to_string();

    if let Some(entry) = cache.entries.get(&key).await {
        tracing::debug!(key = %key, "cache hit");
        metrics::record_cache_hit();
        return entry.to_response();
    }
    metrics::record_cache_miss();

    let response = next.run(request).await;
    let (parts, body) = response.into_parts();
    let body = match axum::body::to_bytes(body, cache.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!(key = %key, error = %err, "response capture failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "error reading response body\n",
            )
                .into_response();
        }
    };

    let entry = CachedResponse {
        status: parts.status,
        headers: parts.headers,
        body,
    };
    tracing::debug!(
        key = %key,
        status = entry.status.as_u16(),
        body_len = entry.body.len(),
        "cache miss"
    );

    let response = entry.to_response();
    if entry.status.is_success() {
        cache.entries.insert(key, Arc::new(entry)).await;
    }
    response
}
