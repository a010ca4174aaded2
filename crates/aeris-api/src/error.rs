use thiserror::Error;

/// Top-level error type for the `aeris-api` crate.
///
/// Covers every failure mode of the Air Quality endpoint: credential
/// rejection, transport failures, rate limiting, structured API errors,
/// and undecodable bodies. `aeris-core` maps these into fetch-error kinds.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// API key rejected by the service.
    #[error("Invalid API key")]
    InvalidApiKey,

    /// Request not authorized (key lacks the Air Quality API, quota
    /// project misconfigured, etc.)
    #[error("Request not authorized: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Quota ───────────────────────────────────────────────────────
    /// Rate limited by the API. Includes retry-after in seconds when the
    /// service provided one (0 otherwise).
    #[error("Rate limited -- retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    // ── API ─────────────────────────────────────────────────────────
    /// Non-2xx response that is neither an auth nor a quota failure.
    #[error("Air Quality API error (HTTP {status}): {message}")]
    Api { message: String, status: u16 },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the request was rejected for credential reasons.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::InvalidApiKey | Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient error worth retrying on the
    /// next poll cycle.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::RateLimited { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
