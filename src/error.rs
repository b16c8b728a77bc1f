//! Error types.
//!
//! Engines never surface errors to the renderer: a rejected configuration is
//! logged and the engine stays inert. These types exist for callers that want
//! to validate up front and for config file loading.

use std::path::PathBuf;

use thiserror::Error;

/// Reasons an engine configuration is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MotionError {
    #[error("rolling text needs at least one item")]
    EmptyItems,

    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f32 },

    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to parse config: {0}")]
    Syntax(#[source] toml::de::Error),

    #[error("Config validation failed: {0}")]
    Invalid(#[from] MotionError),
}

/// Reject a non-finite float config value.
pub(crate) fn ensure_finite(field: &'static str, value: f32) -> Result<(), MotionError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(MotionError::NonFinite { field, value })
    }
}
