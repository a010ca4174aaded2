//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use aeris_config::ConfigError;
use aeris_core::{CoreError, FetchErrorKind};

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const RATE_LIMIT: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Fetch failures ───────────────────────────────────────────────

    #[error("Could not reach the Air Quality service: {message}")]
    #[diagnostic(
        code(aeris::network),
        help(
            "Check connectivity and try again -- the service may be briefly\n\
             unavailable. `aeris watch` rides out transient failures."
        )
    )]
    Network { message: String },

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(aeris::auth_failed),
        help(
            "Verify the API key and that the Air Quality API is enabled for\n\
             its project. Run: aeris config init"
        )
    )]
    AuthFailed { message: String },

    #[error("Rate limited by the Air Quality API")]
    #[diagnostic(
        code(aeris::rate_limited),
        help("Reduce the polling frequency (scan_interval_minutes) or raise the quota.")
    )]
    RateLimited,

    #[error("The service returned a response that could not be decoded")]
    #[diagnostic(
        code(aeris::malformed_response),
        help("Usually transient. Re-run with -vv to log the request details.")
    )]
    MalformedResponse,

    // ── Configuration ────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(aeris::validation))]
    Validation { field: String, reason: String },

    #[error("No API key configured")]
    #[diagnostic(
        code(aeris::no_credentials),
        help(
            "Run: aeris config init\n\
             Or set the AERIS_API_KEY environment variable."
        )
    )]
    NoCredentials,

    #[error("Configuration problem: {message}")]
    #[diagnostic(code(aeris::config))]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Interactive prompt failed: {message}")]
    #[diagnostic(
        code(aeris::prompt),
        help("Re-run in an interactive terminal, or edit the config file directly.")
    )]
    Prompt { message: String },

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(aeris::json))]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Network { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials => exit_code::AUTH,
            Self::RateLimited => exit_code::RATE_LIMIT,
            Self::Validation { .. } | Self::Prompt { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Fetch { kind, message } => match kind {
                FetchErrorKind::Auth => CliError::AuthFailed { message },
                FetchErrorKind::RateLimit => CliError::RateLimited,
                FetchErrorKind::MalformedResponse => CliError::MalformedResponse,
                FetchErrorKind::Network => CliError::Network { message },
            },
            CoreError::Internal(message) => CliError::Internal { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials => CliError::NoCredentials,
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}
