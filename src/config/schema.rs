//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::env;

use serde::{Deserialize, Serialize};

use crate::config::loader::ConfigError;
use crate::config::validation::validate_config;

/// Environment variable overriding the virtual host. The value must include
/// a scheme, e.g. `https://my-custom.host.com`.
pub const VIRTUAL_HOST_VARIABLE: &str = "ALB_ADAPTER_HOST";

/// Origin prepended to every translated path when no override is configured.
pub const DEFAULT_VIRTUAL_HOST: &str = "https://aws-serverless-rust-api.com";

/// Root configuration for the adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Request translation settings.
    pub translator: TranslatorConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

impl AdapterConfig {
    /// Defaults plus overrides taken from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| env::var(key).ok())
    }

    /// Apply overrides using `lookup` in place of the process environment,
    /// then validate the result.
    pub fn apply_overrides_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(host) = lookup(VIRTUAL_HOST_VARIABLE) {
            self.translator.virtual_host = Some(host);
        }
        validate_config(self).map_err(ConfigError::Validation)
    }
}

/// Request translation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Origin for translated request URLs; `None` uses [`DEFAULT_VIRTUAL_HOST`].
    pub virtual_host: Option<String>,

    /// Path prefix removed before requests reach the handler.
    pub strip_base_path: Option<String>,
}

impl TranslatorConfig {
    /// The configured origin, or the default, without a trailing slash.
    pub fn resolved_virtual_host(&self) -> String {
        self.virtual_host
            .as_deref()
            .unwrap_or(DEFAULT_VIRTUAL_HOST)
            .trim_end_matches('/')
            .to_string()
    }
}

/// Observability settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// `EnvFilter` directives, used when `RUST_LOG` is unset.
    pub log_filter: String,

    /// Emit JSON log lines instead of the human readable format.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "alb_http_adapter=info".to_string(),
            json: false,
        }
    }
}
