//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured logging via `tracing`; JSON for production, text for
//!   development, chosen by configuration
//! - Metric updates are cheap counters/gauges behind the `metrics`
//!   facade; the Prometheus exporter is optional and config-gated

pub mod logging;
pub mod metrics;
