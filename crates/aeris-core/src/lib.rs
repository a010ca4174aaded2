// aeris-core: polling coordinator and reactive sensor layer between
// aeris-api and consumers (CLI, host platforms).

pub mod config;
pub mod convert;
pub mod coordinator;
pub mod error;
pub mod model;
pub mod registry;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{Location, PollerConfig};
pub use convert::{NO_RECOMMENDATION, RECOMMENDATION_GROUPS};
pub use coordinator::{Coordinator, CoordinatorState, DEGRADED_THRESHOLD};
pub use error::{CoreError, FetchErrorKind};
pub use model::{FetchResult, MetricReading, MetricValue, SensorDescriptor, SensorKind, ServiceInfo};
pub use registry::{Sensor, SensorRegistry, SensorState};
pub use stream::{RosterStream, SensorStateStream};
