use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::entities::{HealthScore, MetricRecord, Prediction, TrendReport};
use crate::services::classification::ClassificationEngine;
use crate::services::health_score::{HealthScoreEstimator, SCORE_WINDOW};
use crate::services::trends::aggregate_by_type;

/// Rows shown in the recent-metrics table
pub const RECENT_METRICS_LIMIT: usize = 5;

/// Long display date, e.g. "March 5, 2024"
pub const RECENT_DATE_FORMAT: &str = "%B %-d, %Y";

/// A record prepared for the recent-metrics table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct RecentMetric {
    #[serde(flatten)]
    pub record: MetricRecord,

    pub display_date: String,
}

impl From<&MetricRecord> for RecentMetric {
    fn from(record: &MetricRecord) -> Self {
        Self {
            record: record.clone(),
            display_date: record.timestamp.format(RECENT_DATE_FORMAT).to_string(),
        }
    }
}

/// Everything the dashboard renders, computed from one snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct DashboardView {
    pub predictions: Vec<Prediction>,
    pub health_score: HealthScore,
    pub recent_metrics: Vec<RecentMetric>,
    pub trends: TrendReport,
    pub total_records: usize,
}

impl DashboardView {
    /// The view of an empty history
    pub fn empty() -> Self {
        DashboardBuilder::default().build(&[])
    }
}

/// Runs the engines over a snapshot
#[derive(Debug, Clone, Default)]
pub struct DashboardBuilder {
    engine: ClassificationEngine,
    estimator: HealthScoreEstimator,
}

impl DashboardBuilder {
    pub fn new(engine: ClassificationEngine, estimator: HealthScoreEstimator) -> Self {
        Self { engine, estimator }
    }

    /// Build a view from a time-descending snapshot
    pub fn build(&self, snapshot: &[MetricRecord]) -> DashboardView {
        let window = &snapshot[..snapshot.len().min(SCORE_WINDOW)];

        DashboardView {
            predictions: self.engine.classify(window).predictions,
            health_score: self.estimator.estimate(window),
            recent_metrics: snapshot
                .iter()
                .take(RECENT_METRICS_LIMIT)
                .map(RecentMetric::from)
                .collect(),
            trends: aggregate_by_type(snapshot),
            total_records: snapshot.len(),
        }
    }
}
