//! Hot-swappable request handler.
//!
//! # Responsibilities
//! - Hold "the current route table" behind one atomic pointer
//! - Route every request through whichever table is installed
//! - Answer 404 while no table has been installed yet
//!
//! # Design Decisions
//! - `arc-swap` instead of an RwLock: readers never block each other or
//!   the writer; a swap is one atomic pointer store
//! - After `install(t)` returns, every subsequent read observes `t` or a
//!   later table, never an earlier one
//! - Tables are replaced, never mutated; an in-flight request keeps the
//!   Arc it loaded until it finishes

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::http::routes::RouteTable;

/// Shared handle to the currently installed route table.
#[derive(Clone, Default)]
pub struct SwapHandle {
    current: Arc<ArcSwapOption<RouteTable>>,
}

impl SwapHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently installed table, if any.
    pub fn current(&self) -> Option<Arc<RouteTable>> {
        self.current.load_full()
    }

    /// Replace the installed table.
    pub fn install(&self, table: RouteTable) {
        tracing::info!(versions = table.versions().len(), "installing route table");
        self.current.store(Some(Arc::new(table)));
    }

    /// Route a request through the current table.
    pub async fn dispatch(&self, request: Request) -> Response {
        match self.current.load_full() {
            Some(table) => table.call(request).await,
            None => {
                (StatusCode::NOT_FOUND, "no content generation installed\n").into_response()
            }
        }
    }
}
