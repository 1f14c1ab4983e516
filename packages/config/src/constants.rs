// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names used by the copilot

// Provider Configuration
pub const MISTRAL_API_KEY: &str = "MISTRAL_API_KEY";
pub const MISTRAL_MODEL: &str = "MISTRAL_MODEL";
pub const MISTRAL_API_URL: &str = "MISTRAL_API_URL";

// Server Configuration
pub const COPILOT_HOST: &str = "COPILOT_HOST";
pub const COPILOT_PORT: &str = "COPILOT_PORT";
pub const PORT: &str = "PORT"; // Legacy
pub const COPILOT_CORS_ORIGIN: &str = "COPILOT_CORS_ORIGIN";
pub const COPILOT_STATIC_DIR: &str = "COPILOT_STATIC_DIR";
pub const COPILOT_MAX_BODY_BYTES: &str = "COPILOT_MAX_BODY_BYTES";

// Generation Configuration
pub const COPILOT_REQUEST_TIMEOUT_SECS: &str = "COPILOT_REQUEST_TIMEOUT_SECS";
pub const COPILOT_RETRY_ATTEMPTS: &str = "COPILOT_RETRY_ATTEMPTS";
pub const COPILOT_MAX_DOCUMENT_CHARS: &str = "COPILOT_MAX_DOCUMENT_CHARS";

// Diagnostics & Prompts
pub const COPILOT_DIAGNOSTICS_DIR: &str = "COPILOT_DIAGNOSTICS_DIR";
pub const COPILOT_PROMPTS_DIR: &str = "COPILOT_PROMPTS_DIR";

// Defaults
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_MAX_DOCUMENT_CHARS: usize = 60_000;
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;
pub const DEFAULT_DIAGNOSTICS_DIR: &str = "diagnostics";
