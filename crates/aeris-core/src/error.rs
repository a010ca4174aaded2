// ── Core error types ──
//
// User-facing errors from aeris-core. Consumers never see raw HTTP status
// codes or JSON parse failures directly -- the `From<aeris_api::Error>`
// impl collapses transport-layer errors into one of four fetch kinds.

use thiserror::Error;

/// Classification of a failed refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, serde::Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    /// Transport failure: connection refused, DNS, timeout, 5xx.
    Network,
    /// Credential rejected or unauthorized.
    Auth,
    /// Quota exhausted (HTTP 429).
    RateLimit,
    /// Response body could not be decoded.
    MalformedResponse,
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Bad input at setup. Fatal: the coordinator is never constructed.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A refresh failed. Recoverable: the last good result is retained
    /// and the poll timer keeps running.
    #[error("Fetch failed ({kind}): {message}")]
    Fetch {
        kind: FetchErrorKind,
        message: String,
    },

    /// Internal invariant violation.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a configuration failure.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// The fetch-error classification, if this is a fetch failure.
    pub fn fetch_kind(&self) -> Option<FetchErrorKind> {
        match self {
            Self::Fetch { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ──────────────────────────

impl From<aeris_api::Error> for CoreError {
    fn from(err: aeris_api::Error) -> Self {
        let kind = match &err {
            aeris_api::Error::InvalidApiKey | aeris_api::Error::Authentication { .. } => {
                FetchErrorKind::Auth
            }
            aeris_api::Error::RateLimited { .. } => FetchErrorKind::RateLimit,
            aeris_api::Error::Deserialization { .. } => FetchErrorKind::MalformedResponse,
            aeris_api::Error::Api { status, .. } if matches!(*status, 401 | 403) => {
                FetchErrorKind::Auth
            }
            aeris_api::Error::Transport(_)
            | aeris_api::Error::InvalidUrl(_)
            | aeris_api::Error::Api { .. } => FetchErrorKind::Network,
        };

        CoreError::Fetch {
            kind,
            message: err.to_string(),
        }
    }
}
