//! tagserve, a versioned static content server.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────┐
//!                    │                    TAGSERVE                      │
//!                    │                                                  │
//!   Client Request   │  ┌────────┐   ┌────────────┐   ┌─────────────┐  │
//!   ─────────────────┼─▶│ outer  │──▶│ SwapHandle │──▶│ route table │  │
//!                    │  │ router │   │ (arc-swap) │   │  (cache +   │  │
//!                    │  └────────┘   └────────────┘   │   clock)    │  │
//!                    │       │                        └──────┬──────┘  │
//!                    │       │ POST /api/controllers/rebuild │         │
//!                    │       ▼                               ▼         │
//!                    │  ┌─────────────────────┐      ┌─────────────┐   │
//!                    │  │ rebuild coordinator │◀────▶│   catalog   │   │
//!                    │  │ (timer + trigger)   │      │ (dir/demo)  │   │
//!                    │  └─────────────────────┘      └─────────────┘   │
//!                    └──────────────────────────────────────────────────┘
//! ```
//!
//! The coordinator polls the catalog on a timer and on demand; when the
//! version set changes it builds a fresh route table and atomically swaps
//! it into the request path. Requests in flight keep the table they
//! started with.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use tagserve::catalog::{DirCatalog, FixedCatalog, VersionCatalog};
use tagserve::config::{self, CatalogMode, Overrides};
use tagserve::http::{HttpServer, RouteTableBuilder, SwapHandle};
use tagserve::lifecycle::{shutdown, signals, Shutdown};
use tagserve::observability::{logging, metrics};
use tagserve::rebuild::{trigger, RebuildCoordinator, RebuildOutcome};

#[derive(Parser, Debug)]
#[command(name = "tagserve", version, about = "Versioned static content server with hot rebuilds")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address override (address, ":port", or bare port).
    #[arg(long)]
    listen: Option<String>,

    /// Content root override; expects versions/ and latest/ beneath it.
    #[arg(long)]
    content_root: Option<PathBuf>,

    /// Serve built-in demo content instead of a directory catalog.
    #[arg(long)]
    demo: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = config::load(
        cli.config.as_deref(),
        Overrides {
            listen: cli.listen,
            content_root: cli.content_root,
            demo: cli.demo,
        },
    )?;

    logging::init(&config.observability);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        catalog_mode = ?config.catalog.mode,
        poll_interval_secs = config.rebuild.poll_interval_secs,
        "configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "failed to parse metrics address"
            ),
        }
    }

    let catalog: Arc<dyn VersionCatalog> = match config.catalog.mode {
        CatalogMode::Dir => Arc::new(DirCatalog::new(
            &config.catalog.versions_root,
            &config.catalog.latest_root,
        )),
        CatalogMode::Demo => Arc::new(FixedCatalog::demo()),
    };

    let handle = SwapHandle::new();
    let builder = RouteTableBuilder::new(&config)?;
    let (rebuild_trigger, trigger_rx) = trigger::channel();
    let shutdown_coordinator = Shutdown::new();

    let coordinator = RebuildCoordinator::new(
        catalog,
        builder,
        handle.clone(),
        &config.rebuild,
        trigger_rx,
    );

    // The initial build runs before the listener accepts traffic; a broken
    // catalog is fatal here and nowhere else.
    if let RebuildOutcome::Installed { versions } = coordinator.rebuild_now().await? {
        tracing::info!(versions, "initial route table installed");
    }

    let serve_rx = shutdown_coordinator.subscribe();
    let drain_rx = shutdown_coordinator.subscribe();
    tokio::spawn(coordinator.run(shutdown_coordinator.subscribe()));
    tokio::spawn(signals::watch(shutdown_coordinator.clone()));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "listening for connections");

    let server = HttpServer::new(&config, handle, rebuild_trigger);
    let drain = Duration::from_secs(config.timeouts.drain_secs);

    tokio::select! {
        res = server.run(listener, serve_rx) => res?,
        _ = shutdown::drain_deadline(drain_rx, drain) => {
            tracing::warn!(deadline_secs = drain.as_secs(), "drain deadline exceeded, forcing exit");
        }
    }

    tracing::info!("shutdown complete");
    Ok(())
}
