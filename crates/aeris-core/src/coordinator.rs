// ── Polling coordinator ──
//
// Owns fetch timing and the last-known-good snapshot. One background task
// drives periodic refreshes; the outbound call is the only suspension
// point, and ticks never overlap. Failures keep stale data in place and
// escalate to a degraded-availability signal after three in a row.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use aeris_api::{AirQualityClient, TransportConfig};

use crate::config::PollerConfig;
use crate::convert;
use crate::error::{CoreError, FetchErrorKind};
use crate::model::FetchResult;
use crate::registry::SensorRegistry;

/// Consecutive failures before sensors are marked unavailable.
pub const DEGRADED_THRESHOLD: u32 = 3;

// ── CoordinatorState ────────────────────────────────────────────────

/// Snapshot of the coordinator observable by consumers.
///
/// Replaced wholesale on every applied tick: readers either see the
/// previous tick's snapshot or the new one, never a partial update.
#[derive(Debug, Clone, Default)]
pub struct CoordinatorState {
    /// Last successful result. Never cleared by a failed refresh.
    pub last_result: Option<Arc<FetchResult>>,
    pub last_success: Option<DateTime<Utc>>,
    /// Classification of the most recent failure, cleared on success.
    pub last_error: Option<FetchErrorKind>,
    pub consecutive_failures: u32,
}

impl CoordinatorState {
    pub fn is_degraded(&self) -> bool {
        self.consecutive_failures >= DEGRADED_THRESHOLD
    }

    pub fn has_data(&self) -> bool {
        self.last_result.is_some()
    }

    /// How long ago the last successful refresh occurred.
    pub fn data_age(&self) -> Option<chrono::Duration> {
        self.last_success.map(|t| Utc::now() - t)
    }
}

// ── Coordinator ─────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<CoordinatorInner>`. Construction validates
/// the configuration; [`start()`](Self::start) spawns the poll task and
/// [`stop()`](Self::stop) tears it down. The sensor registry is owned
/// here and handed out as an explicit reference, never through ambient
/// global state.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    config: PollerConfig,
    client: AirQualityClient,
    registry: Arc<SensorRegistry>,
    state: watch::Sender<CoordinatorState>,
    /// Serializes fetches: at most one outbound call in flight.
    refresh_gate: Mutex<()>,
    cancel: CancellationToken,
    poll_task: Mutex<Option<JoinHandle<()>>>,
}

impl Coordinator {
    /// Validate the configuration and build a coordinator against the
    /// production endpoint. Does NOT fetch -- call
    /// [`refresh()`](Self::refresh) or [`start()`](Self::start).
    pub fn new(config: PollerConfig) -> Result<Self, CoreError> {
        config.validate()?;
        let transport = TransportConfig {
            timeout: config.timeout,
        };
        let client =
            AirQualityClient::new(config.api_key.clone(), config.language.clone(), &transport)?;
        Ok(Self::assemble(config, client))
    }

    /// Same validation, injected client (tests, custom endpoint root).
    pub fn with_client(config: PollerConfig, client: AirQualityClient) -> Result<Self, CoreError> {
        config.validate()?;
        Ok(Self::assemble(config, client))
    }

    fn assemble(config: PollerConfig, client: AirQualityClient) -> Self {
        let (state, _) = watch::channel(CoordinatorState::default());
        Self {
            inner: Arc::new(CoordinatorInner {
                config,
                client,
                registry: Arc::new(SensorRegistry::new()),
                state,
                refresh_gate: Mutex::new(()),
                cancel: CancellationToken::new(),
                poll_task: Mutex::new(None),
            }),
        }
    }

    /// The validated configuration.
    pub fn config(&self) -> &PollerConfig {
        &self.inner.config
    }

    /// Ownership handle to the sensor registry.
    pub fn registry(&self) -> &Arc<SensorRegistry> {
        &self.inner.registry
    }

    /// Non-blocking read of the latest snapshot. Empty before the first
    /// successful refresh.
    pub fn current(&self) -> CoordinatorState {
        self.inner.state.borrow().clone()
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<CoordinatorState> {
        self.inner.state.subscribe()
    }

    // ── Refresh ──────────────────────────────────────────────────────

    /// Perform exactly one fetch-normalize-apply cycle.
    ///
    /// Serialized against the poll task and other callers, so concurrent
    /// invocations never produce parallel outbound calls.
    pub async fn refresh(&self) -> Result<Arc<FetchResult>, CoreError> {
        let _gate = self.inner.refresh_gate.lock().await;
        let outcome = self.fetch_once().await;
        self.apply(outcome)
    }

    /// One outbound call plus normalization. No state mutation.
    async fn fetch_once(&self) -> Result<FetchResult, CoreError> {
        let location = self.inner.config.location;
        let conditions = self
            .inner
            .client
            .current_conditions(location.latitude, location.longitude)
            .await?;
        Ok(convert::conditions_to_metrics(&conditions))
    }

    /// Apply a fetch outcome to the shared snapshot and the registry.
    fn apply(&self, outcome: Result<FetchResult, CoreError>) -> Result<Arc<FetchResult>, CoreError> {
        match outcome {
            Ok(result) => {
                let result = Arc::new(result);
                let was_degraded = self.current().is_degraded();

                self.inner.state.send_modify(|s| {
                    s.last_result = Some(Arc::clone(&result));
                    s.last_success = Some(Utc::now());
                    s.last_error = None;
                    s.consecutive_failures = 0;
                });

                // Registry sees exactly this tick's result.
                self.inner.registry.sync(&result);
                self.inner.registry.set_available(true);

                if was_degraded {
                    info!("refresh succeeded -- sensor availability restored");
                }
                debug!(metrics = result.len(), "refresh complete");
                Ok(result)
            }
            Err(err) => {
                let kind = err.fetch_kind().unwrap_or(FetchErrorKind::Network);
                let mut failures = 0;
                self.inner.state.send_modify(|s| {
                    s.last_error = Some(kind);
                    s.consecutive_failures += 1;
                    failures = s.consecutive_failures;
                });

                if failures == DEGRADED_THRESHOLD {
                    warn!(failures, %kind, "coordinator degraded -- marking sensors unavailable");
                }
                if failures >= DEGRADED_THRESHOLD {
                    self.inner.registry.set_available(false);
                }
                Err(err)
            }
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Spawn the repeating poll task. Idempotent; the first scheduled
    /// fetch lands one interval after this call.
    pub async fn start(&self) {
        let mut guard = self.inner.poll_task.lock().await;
        if guard.is_some() {
            debug!("poll task already running");
            return;
        }

        let coordinator = self.clone();
        let period = self.inner.config.refresh_interval;
        let cancel = self.inner.cancel.clone();
        *guard = Some(tokio::spawn(poll_task(coordinator, period, cancel)));
        info!(interval_secs = period.as_secs(), "polling started");
    }

    /// Cancel the poll task and wait for it to finish.
    ///
    /// An in-flight fetch is allowed to complete, but its result is
    /// discarded rather than applied.
    pub async fn stop(&self) {
        self.inner.cancel.cancel();
        let handle = self.inner.poll_task.lock().await.take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
        debug!("coordinator stopped");
    }
}

// ── Background task ─────────────────────────────────────────────────

/// Periodically refresh until cancelled. Ticks that would overlap a
/// pending refresh are skipped, not queued.
async fn poll_task(coordinator: Coordinator, period: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let Ok(_gate) = coordinator.inner.refresh_gate.try_lock() else {
                    debug!("refresh still pending -- skipping tick");
                    continue;
                };

                let outcome = coordinator.fetch_once().await;

                // stop() during the outbound call: discard, don't apply.
                if cancel.is_cancelled() {
                    break;
                }

                if let Err(e) = coordinator.apply(outcome) {
                    warn!(error = %e, "scheduled refresh failed");
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::Location;

    fn test_config() -> PollerConfig {
        PollerConfig {
            api_key: SecretString::from("test-key".to_string()),
            location: Location::new(52.52, 13.405),
            refresh_interval: Duration::from_millis(20),
            ..PollerConfig::default()
        }
    }

    fn coordinator_against(server: &MockServer) -> Coordinator {
        let client = AirQualityClient::from_reqwest(
            &server.uri(),
            SecretString::from("test-key".to_string()),
            "en",
            reqwest::Client::new(),
        )
        .unwrap();
        Coordinator::with_client(test_config(), client).unwrap()
    }

    fn success_body(aqi: i64) -> serde_json::Value {
        json!({
            "indexes": [{"code": "uaqi", "aqi": aqi, "category": "Fair"}],
            "pollutants": [{
                "code": "pm25",
                "concentration": {"value": 12.3, "units": "µg/m³"}
            }],
            "healthRecommendations": {"elderly": "Limit outdoor exertion."}
        })
    }

    fn lookup() -> wiremock::MockBuilder {
        Mock::given(method("POST")).and(path("/v1/currentConditions:lookup"))
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = PollerConfig {
            location: Location::new(200.0, 0.0),
            ..test_config()
        };
        assert!(matches!(
            Coordinator::new(config),
            Err(CoreError::Config { .. })
        ));
    }

    #[tokio::test]
    async fn current_is_empty_before_first_refresh() {
        let server = MockServer::start().await;
        let coordinator = coordinator_against(&server);

        let state = coordinator.current();
        assert!(!state.has_data());
        assert!(state.last_error.is_none());
    }

    #[tokio::test]
    async fn refresh_populates_state_and_registry() {
        let server = MockServer::start().await;
        lookup()
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body(55)))
            .mount(&server)
            .await;

        let coordinator = coordinator_against(&server);
        let result = coordinator.refresh().await.unwrap();

        assert_eq!(result.get("uaqi").unwrap().reading.as_f64(), Some(55.0));
        assert_eq!(result.get("pm25").unwrap().unit.as_deref(), Some("µg/m³"));
        assert_eq!(
            result
                .get("recommendation_elderly")
                .unwrap()
                .reading
                .as_text(),
            Some("Limit outdoor exertion.")
        );

        let state = coordinator.current();
        assert!(state.has_data());
        assert!(state.last_success.is_some());

        let registry = coordinator.registry();
        assert!(registry.get("uaqi").is_some());
        assert!(registry.get("recommendation_children").is_some());
    }

    #[tokio::test]
    async fn failed_refresh_keeps_stale_data() {
        let server = MockServer::start().await;
        lookup()
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body(42)))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        lookup()
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let coordinator = coordinator_against(&server);
        coordinator.refresh().await.unwrap();

        let err = coordinator.refresh().await.unwrap_err();
        assert_eq!(err.fetch_kind(), Some(FetchErrorKind::Network));

        let state = coordinator.current();
        let result = state.last_result.as_ref().unwrap();
        assert_eq!(result.get("uaqi").unwrap().reading.as_f64(), Some(42.0));
        assert_eq!(state.last_error, Some(FetchErrorKind::Network));
        assert_eq!(state.consecutive_failures, 1);
    }

    #[tokio::test]
    async fn three_failures_degrade_then_success_restores() {
        let server = MockServer::start().await;
        lookup()
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body(42)))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        lookup()
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(3)
            .mount(&server)
            .await;
        lookup()
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body(60)))
            .mount(&server)
            .await;

        let coordinator = coordinator_against(&server);
        coordinator.refresh().await.unwrap();
        let registry = Arc::clone(coordinator.registry());

        for expected_failures in 1..=3u32 {
            coordinator.refresh().await.unwrap_err();
            let state = coordinator.current();
            assert_eq!(state.consecutive_failures, expected_failures);
            let degraded = expected_failures >= DEGRADED_THRESHOLD;
            assert_eq!(state.is_degraded(), degraded);
            assert_eq!(
                registry.get("uaqi").unwrap().state().available,
                !degraded,
                "availability should flip only at the threshold"
            );
        }

        // One success clears the degradation immediately.
        coordinator.refresh().await.unwrap();
        let state = coordinator.current();
        assert!(!state.is_degraded());
        assert!(state.last_error.is_none());
        assert!(registry.get("uaqi").unwrap().state().available);
        assert_eq!(
            state
                .last_result
                .as_ref()
                .unwrap()
                .get("uaqi")
                .unwrap()
                .reading
                .as_f64(),
            Some(60.0)
        );
    }

    #[tokio::test]
    async fn auth_failure_is_classified() {
        let server = MockServer::start().await;
        lookup()
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let coordinator = coordinator_against(&server);
        let err = coordinator.refresh().await.unwrap_err();
        assert_eq!(err.fetch_kind(), Some(FetchErrorKind::Auth));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn poll_task_refreshes_on_interval() {
        let server = MockServer::start().await;
        lookup()
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body(55)))
            .mount(&server)
            .await;

        let coordinator = coordinator_against(&server);
        coordinator.start().await;
        coordinator.start().await; // idempotent

        let mut state_rx = coordinator.subscribe();
        tokio::time::timeout(Duration::from_secs(5), async {
            while !state_rx.borrow_and_update().has_data() {
                state_rx.changed().await.unwrap();
            }
        })
        .await
        .expect("poll task should refresh within the timeout");

        coordinator.stop().await;
        assert!(coordinator.current().has_data());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn stop_discards_in_flight_result() {
        let server = MockServer::start().await;
        lookup()
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(success_body(55))
                    .set_delay(Duration::from_millis(400)),
            )
            .mount(&server)
            .await;

        let coordinator = coordinator_against(&server);
        coordinator.start().await;

        // Let the first tick start its (slow) fetch, then stop mid-flight.
        tokio::time::sleep(Duration::from_millis(100)).await;
        coordinator.stop().await;

        assert!(
            !coordinator.current().has_data(),
            "a result arriving after stop() must be discarded"
        );
        assert!(coordinator.registry().is_empty());
    }
}
