//! Error types for the LawHelp intake service.

use std::time::Duration;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Field-level validation error. User-correctable; surfaced verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Which submission field failed ("problem" or "email").
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Generation collaborator errors.
///
/// Never shown to users directly — handlers map these to a generic
/// retry-later message and log the cause server-side.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Invalid response from model: {reason}")]
    InvalidResponse { reason: String },

    #[error("Generation timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Email delivery errors.
///
/// Fully swallowed by the intake pipeline: converted to a typed
/// notification outcome and logged, never propagated to the caller.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to build email: {0}")]
    BuildFailed(String),

    #[error("SMTP send failed: {0}")]
    SendFailed(String),

    #[error("Delivery timed out after {timeout:?}")]
    Timeout { timeout: Duration },
}
