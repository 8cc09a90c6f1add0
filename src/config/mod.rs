//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (schema.rs)
//!     → optional TOML file (loader.rs)
//!     → environment overrides: ENV, DATABASE_URL, REDIS_URL, API_ROOT_PATH
//!     → validation.rs (semantic checks)
//!     → ApiConfig (validated, immutable)
//!     → handed to ApiServer at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow running with no file at all
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_effective_config, ConfigError};
pub use schema::ApiConfig;
pub use schema::{CacheConfig, ListenerConfig, ObservabilityConfig, TimeoutConfig};
