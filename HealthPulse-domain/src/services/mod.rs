// Domain services
// This module contains business logic implementations.
pub mod classification;
pub mod dashboard;
pub mod health_score;
pub mod metrics;
pub mod profiles;
pub mod trends;

// Re-export the engines and service traits
pub use classification::{classify, Assessment, ClassificationEngine, ThresholdRule, ThresholdTable};
pub use dashboard::{DashboardBuilder, DashboardView, RecentMetric};
pub use health_score::{estimate_health_score, HealthScoreEstimator};
pub use metrics::{create_default_metric_service, MetricService, MetricServiceError, MetricServiceTrait};
pub use profiles::{create_default_profile_service, ProfileService, ProfileServiceError, ProfileServiceTrait};
pub use trends::aggregate_by_type;
