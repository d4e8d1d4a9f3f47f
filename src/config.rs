//! Configuration, built from environment variables.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::llm::{LlmBackend, LlmConfig};

/// Credential values that mean "no real credential configured".
///
/// Checked-in sample configs ship these so that a fresh deployment falls
/// back to simulated email delivery instead of failing on every submission.
const PLACEHOLDER_CREDENTIALS: &[&str] = &["", "placeholder", "change-me"];

/// Top-level service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port for the HTTP API.
    pub port: u16,
    /// Deadline for a single generation-collaborator call.
    pub generation_timeout: Duration,
    /// Deadline for a single email delivery attempt.
    pub delivery_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = env_parsed("LAWHELP_PORT", 8080);
        let generation_timeout =
            Duration::from_secs(env_parsed("LAWHELP_GENERATION_TIMEOUT_SECS", 30));
        let delivery_timeout =
            Duration::from_secs(env_parsed("LAWHELP_DELIVERY_TIMEOUT_SECS", 20));

        Self {
            port,
            generation_timeout,
            delivery_timeout,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            generation_timeout: Duration::from_secs(30),
            delivery_timeout: Duration::from_secs(20),
        }
    }
}

/// Build the LLM configuration from environment variables.
///
/// `LAWHELP_LLM_BACKEND` selects `anthropic` (default) or `openai`; the
/// matching `*_API_KEY` variable is required.
pub fn llm_config_from_env() -> Result<LlmConfig, ConfigError> {
    let backend = match std::env::var("LAWHELP_LLM_BACKEND")
        .unwrap_or_else(|_| "anthropic".to_string())
        .to_lowercase()
        .as_str()
    {
        "anthropic" => LlmBackend::Anthropic,
        "openai" => LlmBackend::OpenAi,
        other => {
            return Err(ConfigError::InvalidValue {
                key: "LAWHELP_LLM_BACKEND".to_string(),
                message: format!("unknown backend '{other}' (expected anthropic or openai)"),
            });
        }
    };

    let key_var = match backend {
        LlmBackend::Anthropic => "ANTHROPIC_API_KEY",
        LlmBackend::OpenAi => "OPENAI_API_KEY",
    };
    let api_key = std::env::var(key_var)
        .map_err(|_| ConfigError::MissingEnvVar(key_var.to_string()))?;

    let model = std::env::var("LAWHELP_MODEL").unwrap_or_else(|_| {
        match backend {
            LlmBackend::Anthropic => "claude-sonnet-4-20250514",
            LlmBackend::OpenAi => "gpt-4o",
        }
        .to_string()
    });

    Ok(LlmConfig {
        backend,
        api_key: SecretString::from(api_key),
        model,
    })
}

/// SMTP delivery configuration.
///
/// Absent entirely (no host, or a placeholder password) means the notifier
/// runs in simulated mode.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
}

impl SmtpConfig {
    /// Build config from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set or the password is a
    /// placeholder (delivery disabled, notifier simulates).
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("SMTP_HOST").ok()?;

        let password = std::env::var("SMTP_PASSWORD").unwrap_or_default();
        if PLACEHOLDER_CREDENTIALS.contains(&password.as_str()) {
            return None;
        }

        let port: u16 = env_parsed("SMTP_PORT", 587);
        let username = std::env::var("SMTP_USERNAME").unwrap_or_default();
        let from_address =
            std::env::var("SMTP_FROM_ADDRESS").unwrap_or_else(|_| username.clone());

        Some(Self {
            host,
            port,
            username,
            password,
            from_address,
        })
    }
}

/// Speech synthesis configuration (OpenAI-compatible TTS endpoint).
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub model: String,
    pub voice: String,
}

impl SpeechConfig {
    /// Build config from environment variables.
    ///
    /// Returns `None` if `OPENAI_API_KEY` is not set (speech disabled).
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").ok()?;

        let base_url = std::env::var("LAWHELP_TTS_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let model = std::env::var("LAWHELP_TTS_MODEL").unwrap_or_else(|_| "tts-1".to_string());
        let voice = std::env::var("LAWHELP_TTS_VOICE").unwrap_or_else(|_| "alloy".to_string());

        Some(Self {
            api_key: SecretString::from(api_key),
            base_url,
            model,
            voice,
        })
    }
}

/// Read an env var and parse it, falling back to a default.
fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
