//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! TOML file (optional)
//!     → loader.rs (parse & deserialize)
//!     → env var overrides (PORT, TAGSERVE_*)
//!     → CLI overrides
//!     → validation.rs (semantic checks, all errors at once)
//!     → ServerConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Every section has defaults so a missing file still yields a runnable
//!   server (point it at a content root or pass --demo)
//! - Validation separates syntactic (serde) from semantic checks
//! - Env overrides mirror the deployment surface: a bare port in `PORT`
//!   or the listen address is normalised to `0.0.0.0:<port>`

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load, ConfigError, Overrides};
pub use schema::{
    CacheConfig, CatalogConfig, CatalogMode, LandingConfig, ListenerConfig, LogFormat,
    ObservabilityConfig, RebuildConfig, ServerConfig, TimeoutConfig,
};
pub use validation::{validate, ValidationError};
