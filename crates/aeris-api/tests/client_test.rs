// Integration tests for `AirQualityClient` using wiremock.
#![allow(clippy::unwrap_used)]

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use aeris_api::{AirQualityClient, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, AirQualityClient) {
    let server = MockServer::start().await;
    let client = AirQualityClient::from_reqwest(
        &server.uri(),
        SecretString::from("test-key".to_string()),
        "en",
        reqwest::Client::new(),
    )
    .expect("client construction");
    (server, client)
}

fn lookup_path() -> wiremock::matchers::PathExactMatcher {
    path("/v1/currentConditions:lookup")
}

// ── Happy path ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_lookup_success() {
    let (server, client) = setup().await;

    let body = json!({
        "dateTime": "2024-05-01T12:00:00Z",
        "regionCode": "us",
        "indexes": [
            {
                "code": "uaqi",
                "displayName": "Universal AQI",
                "aqi": 55,
                "category": "Fair",
                "dominantPollutant": "pm25"
            }
        ],
        "pollutants": [
            {
                "code": "pm25",
                "displayName": "PM2.5",
                "concentration": { "value": 12.3, "units": "MICROGRAMS_PER_CUBIC_METER" }
            }
        ],
        "healthRecommendations": {
            "elderly": "Limit outdoor exertion."
        }
    });

    Mock::given(method("POST"))
        .and(lookup_path())
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({
            "universalAqi": true,
            "location": { "latitude": 52.52, "longitude": 13.405 },
            "languageCode": "en"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let conditions = client.current_conditions(52.52, 13.405).await.unwrap();

    assert_eq!(conditions.region_code.as_deref(), Some("us"));
    assert_eq!(conditions.indexes.len(), 1);
    assert_eq!(conditions.indexes[0].aqi, Some(55));
    assert_eq!(conditions.pollutants[0].code, "pm25");
    assert_eq!(
        conditions.pollutants[0]
            .concentration
            .as_ref()
            .and_then(|c| c.value),
        Some(12.3)
    );
    assert_eq!(
        conditions.health_recommendations.get("elderly").map(String::as_str),
        Some("Limit outdoor exertion.")
    );
}

#[tokio::test]
async fn test_lookup_tolerates_sparse_response() {
    let (server, client) = setup().await;

    // No pollutants, no indexes, no recommendations -- still a valid payload.
    Mock::given(method("POST"))
        .and(lookup_path())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "regionCode": "de" })))
        .mount(&server)
        .await;

    let conditions = client.current_conditions(52.52, 13.405).await.unwrap();
    assert!(conditions.indexes.is_empty());
    assert!(conditions.pollutants.is_empty());
    assert!(conditions.health_recommendations.is_empty());
}

// ── Error classification ────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_maps_to_invalid_key() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(lookup_path())
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client.current_conditions(0.0, 0.0).await.unwrap_err();
    assert!(matches!(err, Error::InvalidApiKey));
    assert!(err.is_auth());
}

#[tokio::test]
async fn test_forbidden_carries_service_message() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(lookup_path())
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {
                "code": 403,
                "message": "Air Quality API has not been used in project 1234 before",
                "status": "PERMISSION_DENIED"
            }
        })))
        .mount(&server)
        .await;

    let err = client.current_conditions(0.0, 0.0).await.unwrap_err();
    match err {
        Error::Authentication { message } => {
            assert!(message.contains("has not been used"));
        }
        other => panic!("expected Authentication, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rate_limited_reads_retry_after() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(lookup_path())
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "42"))
        .mount(&server)
        .await;

    let err = client.current_conditions(0.0, 0.0).await.unwrap_err();
    match err {
        Error::RateLimited { retry_after_secs } => assert_eq!(retry_after_secs, 42),
        other => panic!("expected RateLimited, got {other:?}"),
    }
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_server_error_is_api_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(lookup_path())
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client.current_conditions(0.0, 0.0).await.unwrap_err();
    match &err {
        Error::Api { status, .. } => assert_eq!(*status, 500),
        other => panic!("expected Api, got {other:?}"),
    }
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(lookup_path())
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = client.current_conditions(0.0, 0.0).await.unwrap_err();
    match err {
        Error::Deserialization { body, .. } => assert!(body.contains("not json")),
        other => panic!("expected Deserialization, got {other:?}"),
    }
}
