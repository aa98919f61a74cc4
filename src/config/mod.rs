//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → optional config file (TOML), loader.rs
//!     → environment overrides (REDIS_URL or REDIS_HOST/PORT/PASSWORD, ...)
//!     → validation.rs (semantic checks)
//!     → JarConfig (validated, immutable)
//!     → handed to startup, which builds every subsystem from it
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::JarConfig;
pub use schema::ListenerConfig;
pub use schema::LogFormat;
pub use schema::ObservabilityConfig;
pub use schema::ReconnectConfig;
pub use schema::StoreBackend;
pub use schema::StoreConfig;
