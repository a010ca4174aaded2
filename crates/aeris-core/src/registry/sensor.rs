// ── Sensor observer ──
//
// One sensor per metric key. The descriptor is immutable; all mutable
// state flows through a watch channel so any number of consumers can
// follow updates without locking.

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::model::{MetricReading, MetricValue, SensorDescriptor};

/// Mutable state of one sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorState {
    /// Last good value record pushed by a refresh.
    pub record: MetricValue,
    /// Set when the key was absent from the latest refresh.
    pub stale: bool,
    /// Cleared after repeated refresh failures, restored on success.
    pub available: bool,
    pub last_updated: Option<DateTime<Utc>>,
}

impl SensorState {
    fn new(record: MetricValue) -> Self {
        Self {
            record,
            stale: false,
            available: true,
            last_updated: Some(Utc::now()),
        }
    }

    /// The reading consumers should display. While the key is missing
    /// from refreshes the sensor reports `Unknown`; the last good record
    /// stays accessible through [`record`](Self::record).
    pub fn reading(&self) -> MetricReading {
        if self.stale {
            MetricReading::Unknown
        } else {
            self.record.reading.clone()
        }
    }
}

/// An addressable consumer of one metric from the coordinator snapshot.
///
/// Created lazily by the registry on first sight of a key; never
/// destroyed while the poller runs.
pub struct Sensor {
    descriptor: SensorDescriptor,
    state: watch::Sender<SensorState>,
}

impl Sensor {
    pub(crate) fn new(descriptor: SensorDescriptor, record: MetricValue) -> Self {
        let (state, _) = watch::channel(SensorState::new(record));
        Self { descriptor, state }
    }

    pub fn descriptor(&self) -> &SensorDescriptor {
        &self.descriptor
    }

    pub fn key(&self) -> &str {
        &self.descriptor.key
    }

    /// Current state (cheap clone of the watch slot).
    pub fn state(&self) -> SensorState {
        self.state.borrow().clone()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<SensorState> {
        self.state.subscribe()
    }

    /// Apply a fresh value record.
    ///
    /// `send_modify` notifies unconditionally -- one state write per
    /// refresh even when the value is unchanged, since downstream history
    /// depends on an event per tick, not only per change.
    pub(crate) fn push(&self, record: MetricValue) {
        self.state.send_modify(|s| {
            s.record = record;
            s.stale = false;
            s.last_updated = Some(Utc::now());
        });
    }

    /// The key was missing from the latest refresh: keep the record,
    /// report `Unknown` until it reappears.
    pub(crate) fn mark_stale(&self) {
        self.state.send_modify(|s| s.stale = true);
    }

    /// Availability fan-out. Only notifies when the flag actually flips.
    pub(crate) fn set_available(&self, available: bool) {
        self.state.send_if_modified(|s| {
            if s.available == available {
                false
            } else {
                s.available = available;
                true
            }
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::SensorKind;

    fn record(v: f64) -> MetricValue {
        MetricValue::new(MetricReading::Number(v), SensorKind::Pollutant)
    }

    fn sensor() -> Sensor {
        Sensor::new(
            SensorDescriptor::new("pm25", SensorKind::Pollutant, None),
            record(1.0),
        )
    }

    #[test]
    fn push_notifies_even_for_identical_record() {
        let s = sensor();
        let mut rx = s.subscribe();
        rx.borrow_and_update();

        s.push(record(1.0));
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        s.push(record(1.0));
        assert!(rx.has_changed().unwrap());
    }

    #[test]
    fn stale_sensor_reads_unknown_but_keeps_record() {
        let s = sensor();
        s.push(record(42.0));
        s.mark_stale();

        let state = s.state();
        assert!(state.stale);
        assert!(state.reading().is_unknown());
        assert_eq!(state.record.reading.as_f64(), Some(42.0));

        // Key reappears: reading is restored on the same push.
        s.push(record(43.0));
        assert_eq!(s.state().reading().as_f64(), Some(43.0));
    }

    #[test]
    fn availability_only_notifies_on_flip() {
        let s = sensor();
        let mut rx = s.subscribe();
        rx.borrow_and_update();

        s.set_available(true); // already available
        assert!(!rx.has_changed().unwrap());

        s.set_available(false);
        assert!(rx.has_changed().unwrap());
        assert!(!s.state().available);
    }
}
