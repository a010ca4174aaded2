// ── Reactive streams ──
//
// Subscription adapters for consuming registry and sensor changes as
// `Stream`s, for callers that prefer combinators over raw watch channels.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::registry::{Sensor, SensorRegistry, SensorState};

/// A subscription to the sensor roster.
///
/// Yields the full (key-ordered) sensor list whenever a new sensor is
/// registered. Provides both point-in-time snapshot access and reactive
/// change notification.
pub struct RosterStream {
    current: Arc<Vec<Arc<Sensor>>>,
    receiver: watch::Receiver<Arc<Vec<Arc<Sensor>>>>,
}

impl RosterStream {
    pub fn new(registry: &SensorRegistry) -> Self {
        let receiver = registry.subscribe();
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// The snapshot captured at creation time.
    pub fn current(&self) -> &Arc<Vec<Arc<Sensor>>> {
        &self.current
    }

    /// The latest snapshot (may have changed since creation).
    pub fn latest(&self) -> Arc<Vec<Arc<Sensor>>> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next roster change, returning the new snapshot.
    /// Returns `None` if the registry has been dropped.
    pub async fn changed(&mut self) -> Option<Arc<Vec<Arc<Sensor>>>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> RosterWatchStream {
        RosterWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter yielding roster snapshots.
pub struct RosterWatchStream {
    inner: WatchStream<Arc<Vec<Arc<Sensor>>>>,
}

impl Stream for RosterWatchStream {
    type Item = Arc<Vec<Arc<Sensor>>>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

/// `Stream` adapter yielding one sensor's state on every write.
pub struct SensorStateStream {
    inner: WatchStream<SensorState>,
}

impl SensorStateStream {
    pub fn new(sensor: &Sensor) -> Self {
        Self {
            inner: WatchStream::new(sensor.subscribe()),
        }
    }
}

impl Stream for SensorStateStream {
    type Item = SensorState;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
