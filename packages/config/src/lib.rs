// ABOUTME: Runtime configuration for the requirements copilot
// ABOUTME: Reads provider credentials, server and generation settings from the environment

pub mod constants;

use std::env;
use std::num::ParseIntError;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use constants::*;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {source}")]
    InvalidNumber {
        name: &'static str,
        #[source]
        source: ParseIntError,
    },
    #[error("Port {0} is out of valid range (1-65535)")]
    PortOutOfRange(u16),
    #[error("{0} must be greater than zero")]
    MustBePositive(&'static str),
}

/// Process-wide configuration, read once at startup
#[derive(Debug, Clone)]
pub struct Config {
    /// Provider credential. `None` degrades generation to a failure-on-use state.
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub api_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
    pub static_dir: Option<PathBuf>,
    /// Largest accepted request body
    pub max_body_bytes: usize,
    pub request_timeout: Duration,
    pub retry_attempts: u32,
    pub max_document_chars: usize,
    pub diagnostics_dir: PathBuf,
    pub prompts_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: None,
            api_url: None,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
            static_dir: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            max_document_chars: DEFAULT_MAX_DOCUMENT_CHARS,
            diagnostics_dir: PathBuf::from(DEFAULT_DIAGNOSTICS_DIR),
            prompts_dir: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = non_empty(MISTRAL_API_KEY);
        if api_key.is_none() {
            warn!(
                "{} not set - generation requests will fail until a key is provided",
                MISTRAL_API_KEY
            );
        }

        let model = non_empty(MISTRAL_MODEL);
        if let Some(model) = &model {
            info!("Using custom provider model: {}", model);
        }

        let port_var = [COPILOT_PORT, PORT]
            .into_iter()
            .find_map(|name| non_empty(name).map(|raw| (name, raw)));
        let port = match port_var {
            Some((name, raw)) => parse_number::<u16>(name, &raw)?,
            None => DEFAULT_PORT,
        };
        if port == 0 {
            return Err(ConfigError::PortOutOfRange(port));
        }

        let timeout_secs = match non_empty(COPILOT_REQUEST_TIMEOUT_SECS) {
            Some(raw) => parse_number::<u64>(COPILOT_REQUEST_TIMEOUT_SECS, &raw)?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            return Err(ConfigError::MustBePositive(COPILOT_REQUEST_TIMEOUT_SECS));
        }

        let retry_attempts = match non_empty(COPILOT_RETRY_ATTEMPTS) {
            Some(raw) => parse_number::<u32>(COPILOT_RETRY_ATTEMPTS, &raw)?,
            None => DEFAULT_RETRY_ATTEMPTS,
        };
        if retry_attempts == 0 {
            return Err(ConfigError::MustBePositive(COPILOT_RETRY_ATTEMPTS));
        }

        let max_document_chars = match non_empty(COPILOT_MAX_DOCUMENT_CHARS) {
            Some(raw) => parse_number::<usize>(COPILOT_MAX_DOCUMENT_CHARS, &raw)?,
            None => DEFAULT_MAX_DOCUMENT_CHARS,
        };
        if max_document_chars == 0 {
            return Err(ConfigError::MustBePositive(COPILOT_MAX_DOCUMENT_CHARS));
        }

        let max_body_bytes = match non_empty(COPILOT_MAX_BODY_BYTES) {
            Some(raw) => parse_number::<usize>(COPILOT_MAX_BODY_BYTES, &raw)?,
            None => DEFAULT_MAX_BODY_BYTES,
        };
        if max_body_bytes == 0 {
            return Err(ConfigError::MustBePositive(COPILOT_MAX_BODY_BYTES));
        }

        Ok(Config {
            api_key,
            model,
            api_url: non_empty(MISTRAL_API_URL),
            host: non_empty(COPILOT_HOST).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            cors_origin: non_empty(COPILOT_CORS_ORIGIN)
                .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
            static_dir: non_empty(COPILOT_STATIC_DIR).map(PathBuf::from),
            max_body_bytes,
            request_timeout: Duration::from_secs(timeout_secs),
            retry_attempts,
            max_document_chars,
            diagnostics_dir: non_empty(COPILOT_DIAGNOSTICS_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DIAGNOSTICS_DIR)),
            prompts_dir: non_empty(COPILOT_PROMPTS_DIR).map(PathBuf::from),
        })
    }

    pub fn provider_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

fn parse_number<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr<Err = ParseIntError>,
{
    raw.trim()
        .parse::<T>()
        .map_err(|source| ConfigError::InvalidNumber { name, source })
}
