//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the outer Axum router: rebuild trigger, liveness, fallback
//!   dispatch into the swap handle
//! - Wire up middleware (tracing, request ID, timeout)
//! - Serve with graceful shutdown
//!
//! The outer router never changes at runtime; everything reachable
//! through the fallback is rebuilt and swapped by the coordinator.

use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::http::swap::SwapHandle;
use crate::observability::metrics;
use crate::rebuild::RebuildTrigger;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub handle: SwapHandle,
    pub trigger: RebuildTrigger,
}

/// HTTP server for versioned content.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server around the swap handle and the rebuild
    /// trigger.
    pub fn new(config: &ServerConfig, handle: SwapHandle, trigger: RebuildTrigger) -> Self {
        let router = Self::build_router(config, AppState { handle, trigger });
        Self { router }
    }

    /// Build the outer router with all middleware layers.
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .route("/api/controllers/rebuild", post(request_rebuild))
            .route("/healthz", get(health))
            .fallback(dispatch)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
    }

    /// The assembled router; also the integration-test entry point.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until the shutdown signal, then drain.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                tracing::info!("graceful shutdown started");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Fallback: route everything else through the current table.
async fn dispatch(State(state): State<AppState>, request: Request) -> Response {
    let response = state.handle.dispatch(request).await;
    metrics::record_request(response.status());
    response
}

/// Fire the debounced rebuild trigger; never waits for the rebuild.
async fn request_rebuild(State(state): State<AppState>) -> impl IntoResponse {
    let status = if state.trigger.request() {
        "queued"
    } else {
        "already-pending"
    };
    tracing::info!(status, "rebuild requested");
    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "status": status })),
    )
}

/// Liveness plus a summary of the installed generation.
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.handle.current() {
        Some(table) => Json(serde_json::json!({
            "status": "ok",
            "versions": table.versions().len(),
            "generation_age_secs": table.built_at().elapsed().as_secs(),
        })),
        None => Json(serde_json::json!({
            "status": "empty",
            "versions": 0,
        })),
    }
}
