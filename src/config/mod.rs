//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//!     → handed to lifecycle::startup to build the engine
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the instance list is fixed for a session
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    CircuitBreakerConfig, EmbedConfig, HealthCheckConfig, InstanceConfig, ListenerConfig,
    LoaderConfig, ObservabilityConfig, RelayConfig,
};
pub use validation::{validate_config, ValidationError};
