// Storage models
pub mod metric;
pub mod profile;

pub use metric::{CreateMetricRequest, MetricRecord};
pub use profile::UserProfile;
