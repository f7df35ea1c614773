use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// One charted observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct TrendPoint {
    pub id: String,

    /// Short display label, e.g. "Mar 05"
    pub date: String,

    pub timestamp: DateTime<Utc>,

    pub value: f64,

    pub unit: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Chart series keyed by metric type, in first-appearance order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct TrendReport {
    #[cfg_attr(feature = "with-api", schema(value_type = Object))]
    pub series: IndexMap<String, Vec<TrendPoint>>,

    /// Records left out because their value did not parse
    pub skipped_invalid: usize,
}

impl TrendReport {
    /// Total number of charted points across all series
    pub fn point_count(&self) -> usize {
        self.series.values().map(Vec::len).sum()
    }
}
