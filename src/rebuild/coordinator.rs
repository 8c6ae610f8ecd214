//! Rebuild scheduling and installation.
//!
//! # Responsibilities
//! - Own the rebuild lifecycle: initial build, timer polls, trigger signals
//! - Serialize rebuild attempts (one in flight, ever)
//! - Skip no-op rebuilds via order-independent version set comparison
//! - Keep the previous generation serving on any failure

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tokio::time::MissedTickBehavior;

use crate::catalog::{CatalogError, VersionCatalog};
use crate::config::RebuildConfig;
use crate::http::routes::{BuildError, RouteTableBuilder};
use crate::http::swap::SwapHandle;
use crate::observability::metrics;

/// Why a rebuild attempt failed. None of these tear down the server.
#[derive(Debug, Error)]
pub enum RebuildError {
    #[error("catalog query failed: {0}")]
    Catalog(#[from] CatalogError),

    #[error("catalog query timed out after {0:?}")]
    CatalogTimeout(Duration),

    #[error("route table build failed: {0}")]
    Build(#[from] BuildError),
}

/// What a successful rebuild attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildOutcome {
    /// A new table was built and installed.
    Installed { versions: usize },
    /// The catalog matched the installed table; nothing was swapped.
    Unchanged,
}

/// Drives rebuilds from two event sources into one serialized routine.
pub struct RebuildCoordinator {
    catalog: Arc<dyn VersionCatalog>,
    builder: RouteTableBuilder,
    handle: SwapHandle,
    poll_interval: Duration,
    catalog_timeout: Duration,
    trigger_rx: mpsc::Receiver<()>,
}

impl RebuildCoordinator {
    pub fn new(
        catalog: Arc<dyn VersionCatalog>,
        builder: RouteTableBuilder,
        handle: SwapHandle,
        config: &RebuildConfig,
        trigger_rx: mpsc::Receiver<()>,
    ) -> Self {
        Self {
            catalog,
            builder,
            handle,
            poll_interval: Duration::from_secs(config.poll_interval_secs.max(1)),
            catalog_timeout: Duration::from_secs(config.catalog_timeout_secs),
            trigger_rx,
        }
    }

    /// One rebuild attempt: query, compare, build, install.
    pub async fn rebuild_now(&self) -> Result<RebuildOutcome, RebuildError> {
        let versions = tokio::time::timeout(self.catalog_timeout, self.catalog.list_versions())
            .await
            .map_err(|_| RebuildError::CatalogTimeout(self.catalog_timeout))??;

        let mut names: Vec<String> = versions.iter().map(|v| v.name.clone()).collect();
        names.sort();
        if let Some(current) = self.handle.current() {
            if current.versions() == names.as_slice() {
                return Ok(RebuildOutcome::Unchanged);
            }
        }

        let table = self.builder.build(versions, self.catalog.unversioned())?;
        let count = table.versions().len();
        self.handle.install(table);
        metrics::set_versions_serving(count);
        Ok(RebuildOutcome::Installed { versions: count })
    }

    async fn attempt(&self, reason: &'static str) {
        match self.rebuild_now().await {
            Ok(RebuildOutcome::Installed { versions }) => {
                tracing::info!(reason, versions, "installed new route table");
                metrics::record_rebuild("installed");
            }
            Ok(RebuildOutcome::Unchanged) => {
                tracing::debug!(reason, "catalog unchanged, skipping rebuild");
                metrics::record_rebuild("unchanged");
            }
            Err(err) => {
                tracing::error!(reason, error = %err, "rebuild failed, keeping current route table");
                metrics::record_rebuild("failed");
            }
        }
    }

    /// Consume both event sources until shutdown. While an attempt runs,
    /// missed ticks are skipped and trigger signals pile up in the single
    /// slot, so at most one rebuild is ever pending behind the running one.
    /// Shutdown also abandons an attempt mid-flight, so a slow catalog
    /// cannot hold the loop past the drain.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately; the initial build already ran.
        ticker.tick().await;

        loop {
            let reason = tokio::select! {
                _ = ticker.tick() => "poll",
                signal = self.trigger_rx.recv() => match signal {
                    Some(()) => "trigger",
                    None => break,
                },
                _ = shutdown.recv() => {
                    tracing::info!("shutdown received, stopping rebuild loop");
                    break;
                }
            };
            tokio::select! {
                () = self.attempt(reason) => {}
                _ = shutdown.recv() => {
                    tracing::info!("shutdown received, abandoning in-flight rebuild");
                    break;
                }
            }
        }
    }
}
