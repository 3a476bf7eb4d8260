//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the virtual host is a usable absolute origin
//! - Check the base path can be matched against a request path
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AdapterConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;
use url::Url;

use crate::config::schema::AdapterConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("virtual host {host:?} is not a valid URL: {reason}")]
    InvalidVirtualHost { host: String, reason: String },

    #[error("virtual host {0:?} must use http or https")]
    UnsupportedScheme(String),

    #[error("virtual host {0:?} must not carry a path, query or fragment")]
    VirtualHostNotOrigin(String),

    #[error("base path {0:?} must not contain '?' or '#'")]
    InvalidBasePath(String),
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &AdapterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Some(host) = &config.translator.virtual_host {
        if let Err(e) = validate_virtual_host(host) {
            errors.push(e);
        }
    }

    if let Some(base) = &config.translator.strip_base_path {
        if base.contains(['?', '#']) {
            errors.push(ValidationError::InvalidBasePath(base.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_virtual_host(host: &str) -> Result<(), ValidationError> {
    let url = Url::parse(host).map_err(|e| ValidationError::InvalidVirtualHost {
        host: host.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ValidationError::UnsupportedScheme(host.to_string()));
    }
    if url.host_str().is_none() {
        return Err(ValidationError::InvalidVirtualHost {
            host: host.to_string(),
            reason: "missing host".to_string(),
        });
    }
    if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
        return Err(ValidationError::VirtualHostNotOrigin(host.to_string()));
    }
    Ok(())
}
