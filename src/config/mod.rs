//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)                 process environment
//!     → loader.rs (parse & deserialize)     → ALB_ADAPTER_HOST
//!     → validation.rs (semantic checks)     ↓
//!     → AdapterConfig ←──────────── apply_env_overrides
//!     → RequestTranslator::new(&config.translator)
//!     → init_logging(&config.observability)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - The environment is read here only; the translator receives plain values

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{AdapterConfig, ObservabilityConfig, TranslatorConfig};
pub use schema::{DEFAULT_VIRTUAL_HOST, VIRTUAL_HOST_VARIABLE};
