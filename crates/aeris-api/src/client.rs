// Air Quality API HTTP client
//
// Wraps `reqwest::Client` with endpoint URL construction, key-in-query
// authentication, status classification, and error-envelope decoding. The
// API key travels as a `SecretString` and is appended to the URL only at
// send time; logging uses the bare endpoint path.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types::{CurrentConditions, LatLng, LookupRequest};

/// Production endpoint root.
pub const DEFAULT_BASE_URL: &str = "https://airquality.googleapis.com";

const LOOKUP_PATH: &str = "v1/currentConditions:lookup";

/// Extra computations requested on every lookup. Everything the sensor
/// layer can surface: recommendations, concentrations, the local index,
/// dominant-pollutant detail, and pollutant background info.
const EXTRA_COMPUTATIONS: [&str; 5] = [
    "HEALTH_RECOMMENDATIONS",
    "POLLUTANT_CONCENTRATION",
    "LOCAL_AQI",
    "DOMINANT_POLLUTANT_CONCENTRATION",
    "POLLUTANT_ADDITIONAL_INFO",
];

/// Async client for the Google Air Quality API.
pub struct AirQualityClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: SecretString,
    language: String,
}

impl AirQualityClient {
    /// Create a client against the production endpoint.
    pub fn new(
        api_key: SecretString,
        language: impl Into<String>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let base_url = Url::parse(DEFAULT_BASE_URL)?;
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            api_key,
            language: language.into(),
        })
    }

    /// Create a client with a custom endpoint root and a pre-built
    /// `reqwest::Client` (tests, proxies).
    pub fn from_reqwest(
        base_url: &str,
        api_key: SecretString,
        language: impl Into<String>,
        http: reqwest::Client,
    ) -> Result<Self, Error> {
        let base_url = Url::parse(base_url)?;
        Ok(Self {
            http,
            base_url,
            api_key,
            language: language.into(),
        })
    }

    /// The endpoint root this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch current conditions for a coordinate pair.
    ///
    /// Performs exactly one outbound request. Any non-2xx status or
    /// undecodable body is returned as a typed [`Error`].
    pub async fn current_conditions(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<CurrentConditions, Error> {
        let mut url = self.join(LOOKUP_PATH)?;
        url.query_pairs_mut()
            .append_pair("key", self.api_key.expose_secret());

        let body = LookupRequest {
            universal_aqi: true,
            location: LatLng { latitude, longitude },
            extra_computations: EXTRA_COMPUTATIONS.into_iter().map(String::from).collect(),
            language_code: self.language.clone(),
        };

        debug!("POST /{LOOKUP_PATH}");

        let resp = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        decode(resp).await
    }

    fn join(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }
}

/// Classify the response status, then decode the JSON body.
async fn decode(resp: reqwest::Response) -> Result<CurrentConditions, Error> {
    let status = resp.status();

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(Error::InvalidApiKey);
    }

    if status == reqwest::StatusCode::FORBIDDEN {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Authentication {
            message: error_message(&body, status.as_u16()),
        });
    }

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        return Err(Error::RateLimited { retry_after_secs });
    }

    let body = resp.text().await.map_err(Error::Transport)?;

    if !status.is_success() {
        return Err(Error::Api {
            message: error_message(&body, status.as_u16()),
            status: status.as_u16(),
        });
    }

    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body,
    })
}

// ── Error envelope ──────────────────────────────────────────────────

#[derive(Debug, serde::Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Extract the `error.message` from a Google error envelope, falling back
/// to a generic HTTP description when the body isn't one.
fn error_message(body: &str, status: u16) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error)
        .map(|e| e.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("HTTP {status}"))
}
