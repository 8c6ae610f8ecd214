//! Versioned static content server library.
//!
//! Serves build artifacts keyed by source-control tag and rebuilds its
//! entire route table at runtime when the set of known tags changes,
//! without dropping in-flight requests.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod rebuild;

pub use config::ServerConfig;
pub use http::{HttpServer, SwapHandle};
pub use lifecycle::Shutdown;
