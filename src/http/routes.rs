//! Route table construction.
//!
//! # Responsibilities
//! - Build one immutable router per content generation
//! - Register per-version, unversioned, landing, and asset routes
//! - Fail fast on version names the router cannot host
//! - Wrap the route set in the response cache, then the uptime clock
//!
//! # Design Decisions
//! - A catalog change produces a whole new table; nothing is patched in
//!   place, so readers can never observe a half-updated route set
//! - The clock layer is outermost: cached entries carry no max-age and
//!   every response, hit or miss, gets a freshly computed one
//! - Name validation turns would-be router panics (duplicate or
//!   overlapping registrations) into build errors that leave the
//!   previous generation serving

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::Path;
use axum::response::{Html, Redirect};
use axum::routing::get;
use axum::{middleware, Router};
use tera::Tera;
use thiserror::Error;
use tower::ServiceExt;

use crate::cache::{self, ResponseCache};
use crate::catalog::{ContentStore, Version};
use crate::config::ServerConfig;
use crate::http::assets::EmbeddedAssets;
use crate::http::content::serve_path;
use crate::http::landing::{self, LandingInfo};
use crate::http::uptime::{self, UptimeClock};

pub const VERSIONS_PREFIX: &str = "/versions";
pub const ALL_PREFIX: &str = "/all";
pub const STATIC_PREFIX: &str = "/static";

/// Why a route table could not be built.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("duplicate version name: {0:?}")]
    DuplicateVersion(String),

    #[error("version name {0:?} cannot be used as a route prefix")]
    InvalidVersionName(String),

    #[error("version names {0:?} and {1:?} produce overlapping routes")]
    OverlappingVersions(String, String),

    #[error("landing page failed: {0}")]
    Template(#[from] tera::Error),
}

/// One immutable build generation: the router plus the version names it
/// was built from (the coordinator's change-detection baseline).
pub struct RouteTable {
    router: Router,
    versions: Vec<String>,
    built_at: Instant,
}

impl RouteTable {
    /// Sorted names of the versions this table serves.
    pub fn versions(&self) -> &[String] {
        &self.versions
    }

    pub fn built_at(&self) -> Instant {
        self.built_at
    }

    /// Run one request through this table's router.
    pub async fn call(&self, request: axum::extract::Request) -> axum::response::Response {
        match self.router.clone().oneshot(request).await {
            Ok(response) => response,
            Err(infallible) => match infallible {},
        }
    }
}

/// Builds route tables from catalog snapshots. Deterministic: identical
/// inputs produce identical tables.
pub struct RouteTableBuilder {
    cache_entries: u64,
    cache_ttl: Duration,
    cache_body_limit: usize,
    content_ttl: Duration,
    title: String,
    source_url: Option<String>,
    tera: Tera,
    assets: Arc<dyn ContentStore>,
}

impl RouteTableBuilder {
    pub fn new(config: &ServerConfig) -> Result<Self, BuildError> {
        Ok(Self {
            cache_entries: config.cache.max_entries,
            cache_ttl: Duration::from_secs(config.cache.ttl_secs),
            cache_body_limit: config.cache.max_body_bytes,
            content_ttl: Duration::from_secs(config.rebuild.poll_interval_secs),
            title: config.landing.title.clone(),
            source_url: config.landing.source_url.clone(),
            tera: landing::template_engine()?,
            assets: Arc::new(EmbeddedAssets),
        })
    }

    /// Construct the full route table for one catalog snapshot.
    pub fn build(
        &self,
        versions: Vec<Version>,
        unversioned: Arc<dyn ContentStore>,
    ) -> Result<RouteTable, BuildError> {
        validate_names(&versions)?;

        let mut router = Router::new();
        for version in &versions {
            router = add_version_routes(router, version);
        }
        router = add_store_routes(router, ALL_PREFIX, unversioned);
        tracing::info!(path = ALL_PREFIX, "registered unversioned route");

        let info = LandingInfo::new(self.title.clone(), self.source_url.clone(), &versions);
        let page = Arc::new(landing::render(&self.tera, &info)?);
        router = router.route(
            "/",
            get(move || {
                let page = page.clone();
                async move { Html(page.as_str().to_owned()) }
            }),
        );
        tracing::info!(path = "/", "registered landing page");

        router = add_store_routes(router, STATIC_PREFIX, self.assets.clone());
        tracing::info!(path = STATIC_PREFIX, "registered asset route");

        let response_cache =
            ResponseCache::new(self.cache_entries, self.cache_ttl, self.cache_body_limit);
        let clock = UptimeClock::new(self.content_ttl);
        let router = router
            .layer(middleware::from_fn_with_state(response_cache, cache::handle))
            .layer(middleware::from_fn_with_state(clock, uptime::set_cache_control));

        let mut names: Vec<String> = versions.into_iter().map(|v| v.name).collect();
        names.sort();

        Ok(RouteTable {
            router,
            versions: names,
            built_at: Instant::now(),
        })
    }
}

/// Register the version's prefix routes: the stripped catch-all, the
/// directory root, and a redirect for the bare prefix.
fn add_version_routes(router: Router, version: &Version) -> Router {
    let base = format!("{VERSIONS_PREFIX}/{}", version.name);
    let router = add_store_routes(router, &base, version.store.clone());
    tracing::info!(path = %base, "registered version route");
    router
}

fn add_store_routes(router: Router, prefix: &str, store: Arc<dyn ContentStore>) -> Router {
    let root_store = store.clone();
    let target = format!("{prefix}/");
    router
        .route(
            &format!("{prefix}/{{*path}}"),
            get(move |Path(path): Path<String>| {
                let store = store.clone();
                async move { serve_path(store, &path).await }
            }),
        )
        .route(
            &format!("{prefix}/"),
            get(move || {
                let store = root_store.clone();
                async move { serve_path(store, "").await }
            }),
        )
        .route(
            prefix,
            get(move || {
                let target = target.clone();
                async move { Redirect::permanent(&target) }
            }),
        )
}

fn validate_names(versions: &[Version]) -> Result<(), BuildError> {
    for version in versions {
        if !valid_route_name(&version.name) {
            return Err(BuildError::InvalidVersionName(version.name.clone()));
        }
    }
    for (i, a) in versions.iter().enumerate() {
        for b in &versions[i + 1..] {
            if a.name == b.name {
                return Err(BuildError::DuplicateVersion(a.name.clone()));
            }
            let (short, long) = if a.name.len() < b.name.len() {
                (&a.name, &b.name)
            } else {
                (&b.name, &a.name)
            };
            // "a" next to "a/b" would nest one catch-all inside another.
            if long.starts_with(short.as_str()) && long.as_bytes()[short.len()] == b'/' {
                return Err(BuildError::OverlappingVersions(
                    short.clone(),
                    long.clone(),
                ));
            }
        }
    }
    Ok(())
}

fn valid_route_name(name: &str) -> bool {
    if name.is_empty() || name.starts_with('/') || name.ends_with('/') {
        return false;
    }
    if name
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return false;
    }
    !name
        .bytes()
        .any(|b| b.is_ascii_whitespace() || matches!(b, b'{' | b'}' | b'?' | b'#' | b'%'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryStore;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};

    fn builder() -> RouteTableBuilder {
        RouteTableBuilder::new(&ServerConfig::default()).unwrap()
    }

    fn version(name: &str) -> Version {
        Version::new(
            name,
            Arc::new(
                MemoryStore::new()
                    .with_file("index.html", format!("<h1>{name}</h1>"))
                    .with_file("docs/guide.html", "guide"),
            ),
        )
    }

    fn request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn serves_version_content_with_prefix_stripped() {
        let table = builder()
            .build(vec![version("v1"), version("kor/1.2.3")], Arc::new(MemoryStore::new()))
            .unwrap();

        let response = table.call(request("/versions/v1/docs/guide.html")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "guide");

        // Full name spans segments; routing uses all of it.
        let response = table.call(request("/versions/kor/1.2.3/index.html")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = table.call(request("/versions/v9/index.html")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn version_root_serves_index_and_bare_prefix_redirects() {
        let table = builder()
            .build(vec![version("v1")], Arc::new(MemoryStore::new()))
            .unwrap();

        let response = table.call(request("/versions/v1/")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("v1"));

        let response = table.call(request("/versions/v1")).await;
        assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/versions/v1/"
        );
    }

    #[tokio::test]
    async fn unversioned_landing_and_assets_are_registered() {
        let unversioned = Arc::new(MemoryStore::new().with_file("index.html", "latest build"));
        let table = builder().build(vec![version("v1")], unversioned).unwrap();

        let response = table.call(request("/all/index.html")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "latest build");

        let response = table.call(request("/")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let page = body_text(response).await;
        assert!(page.contains("/versions/v1/"));

        let response = table.call(request("/static/style.css")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/css"
        );
    }

    #[tokio::test]
    async fn every_response_carries_a_bounded_max_age() {
        let table = builder()
            .build(vec![version("v1")], Arc::new(MemoryStore::new()))
            .unwrap();

        let response = table.call(request("/versions/v1/index.html")).await;
        let header = response
            .headers()
            .get(header::CACHE_CONTROL)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        let secs: u64 = header.strip_prefix("max-age=").unwrap().parse().unwrap();
        assert!(secs <= ServerConfig::default().rebuild.poll_interval_secs);
    }

    #[tokio::test]
    async fn rejects_names_the_router_cannot_host() {
        let b = builder();
        let unversioned = || Arc::new(MemoryStore::new()) as Arc<dyn ContentStore>;

        let err = b
            .build(vec![version("v1"), version("v1")], unversioned())
            .unwrap_err();
        assert!(matches!(err, BuildError::DuplicateVersion(_)));

        let err = b
            .build(vec![version("a"), version("a/b")], unversioned())
            .unwrap_err();
        assert!(matches!(err, BuildError::OverlappingVersions(_, _)));

        for bad in ["", "a b", "a{b", "../up", "a//b", "/abs", "trail/"] {
            let err = b.build(vec![version(bad)], unversioned()).unwrap_err();
            assert!(
                matches!(err, BuildError::InvalidVersionName(_)),
                "expected invalid name for {bad:?}"
            );
        }
    }

    #[tokio::test]
    async fn sibling_names_with_shared_prefix_are_fine() {
        // "v1" and "v1.2" share a prefix but not a path boundary.
        let table = builder()
            .build(
                vec![version("v1"), version("v1.2")],
                Arc::new(MemoryStore::new()),
            )
            .unwrap();
        assert_eq!(table.versions(), ["v1", "v1.2"]);
    }
}
