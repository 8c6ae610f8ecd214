//! HTTP serving subsystem.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → server.rs (outer router: trigger endpoint, healthz, layers)
//!     → swap.rs (read the current route table, atomically)
//!     → routes.rs (per-version routes, cache + clock layers)
//!     → content.rs (store read → response)
//! ```
//!
//! The outer router never changes; everything below the swap handle is
//! rebuilt wholesale when the catalog changes.

pub mod assets;
pub mod content;
pub mod landing;
pub mod routes;
pub mod server;
pub mod swap;
pub mod uptime;

pub use routes::{BuildError, RouteTable, RouteTableBuilder};
pub use server::HttpServer;
pub use swap::SwapHandle;
