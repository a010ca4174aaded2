// ── Sensor registry ──
//
// Maps each normalized metric key to its Sensor, creating sensors lazily
// as new keys appear. Lock-free storage (DashMap) plus a roster watch
// channel that host platforms subscribe to for entity registration.

mod sensor;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::model::{FetchResult, SensorDescriptor, ServiceInfo};

pub use sensor::{Sensor, SensorState};

/// Registry of all sensors discovered so far.
///
/// Keys only ever accumulate: a key that disappears from a later refresh
/// keeps its sensor, which reports `Unknown` until the key returns.
pub struct SensorRegistry {
    sensors: DashMap<String, Arc<Sensor>>,
    /// Full roster, rebuilt whenever a sensor is added. Subscribing is
    /// the host-platform registration boundary: idempotent, non-blocking.
    roster: watch::Sender<Arc<Vec<Arc<Sensor>>>>,
    service: ServiceInfo,
}

impl SensorRegistry {
    pub fn new() -> Self {
        let (roster, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            sensors: DashMap::new(),
            roster,
            service: ServiceInfo::default(),
        }
    }

    /// Fan one refresh result out to the sensor set.
    ///
    /// Unseen keys get a new sensor (descriptor built once, roster
    /// rebuilt); tracked keys get an unconditional state write; tracked
    /// keys absent from `result` are marked stale, never removed.
    pub fn sync(&self, result: &FetchResult) {
        let mut added = 0usize;

        for (key, value) in result.iter() {
            if let Some(sensor) = self.sensors.get(key) {
                sensor.push(value.clone());
                continue;
            }

            let descriptor = SensorDescriptor::new(
                key,
                value.kind,
                value.metadata.get("display_name").map(String::as_str),
            );
            let sensor = Arc::new(Sensor::new(descriptor, value.clone()));
            self.sensors.insert(key.to_owned(), sensor);
            added += 1;
        }

        for entry in self.sensors.iter() {
            if !result.contains_key(entry.key()) {
                if !entry.value().state().stale {
                    warn!(key = %entry.key(), "metric missing from refresh -- sensor reports unknown");
                }
                entry.value().mark_stale();
            }
        }

        if added > 0 {
            debug!(added, total = self.sensors.len(), "registered new sensors");
            self.rebuild_roster();
        }
    }

    /// Propagate the coordinator's availability signal to every sensor.
    pub fn set_available(&self, available: bool) {
        for entry in self.sensors.iter() {
            entry.value().set_available(available);
        }
    }

    /// Look up one sensor by metric key.
    pub fn get(&self, key: &str) -> Option<Arc<Sensor>> {
        self.sensors.get(key).map(|r| Arc::clone(r.value()))
    }

    /// Current roster (cheap `Arc` clone), ordered by key.
    pub fn snapshot(&self) -> Arc<Vec<Arc<Sensor>>> {
        self.roster.borrow().clone()
    }

    /// Subscribe to roster growth.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<Sensor>>>> {
        self.roster.subscribe()
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    /// All tracked metric keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.sensors.iter().map(|r| r.key().clone()).collect();
        keys.sort();
        keys
    }

    /// Service-level metadata shared by every sensor.
    pub fn service_info(&self) -> ServiceInfo {
        self.service
    }

    fn rebuild_roster(&self) {
        let mut sensors: Vec<Arc<Sensor>> =
            self.sensors.iter().map(|r| Arc::clone(r.value())).collect();
        sensors.sort_by(|a, b| a.key().cmp(b.key()));
        self.roster.send_modify(|snap| *snap = Arc::new(sensors));
    }
}

impl Default for SensorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
