//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → groups::build_table turns mounts into a BindingTable
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; mounts never change while serving
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    GatewayConfig, ListenerConfig, LogFormat, MountConfig, MountTarget, ObservabilityConfig,
    TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
