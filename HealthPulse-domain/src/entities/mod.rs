// Domain entities and value objects
pub mod conversions;
pub mod health_score;
pub mod metric;
pub mod prediction;
pub mod profile;
pub mod trend;

// Re-export common types for easier imports
pub use health_score::{HealthScore, RiskLevel};
pub use metric::{parse_metric_value, CreateMetricRequest, InvalidValue, MetricRecord};
pub use prediction::{ClassificationReport, Prediction, RiskTier};
pub use profile::{Condition, RegisterProfileRequest, UnknownCondition, UserProfile};
pub use trend::{TrendPoint, TrendReport};
