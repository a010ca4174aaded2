// Domain model: metric records and sensor identity.

mod descriptor;
mod metric;

pub use descriptor::{SensorDescriptor, SensorKind, ServiceInfo};
pub use metric::{FetchResult, MetricReading, MetricValue};
