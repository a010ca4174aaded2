//! aeris-api: async client for the Google Air Quality REST API.
//!
//! One endpoint matters here: `currentConditions:lookup`. The client owns
//! request construction and error classification; response normalization
//! into sensor metrics lives in `aeris-core`.

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::{AirQualityClient, DEFAULT_BASE_URL};
pub use error::Error;
pub use transport::TransportConfig;
pub use types::{AqiIndex, Concentration, CurrentConditions, Pollutant};
