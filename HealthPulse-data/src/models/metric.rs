use serde::{Deserialize, Serialize};

/// Storage model for a single health metric observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Unique identifier assigned on creation
    pub id: String,

    /// Owner of the record
    pub user_id: String,

    /// Metric type tag (e.g. bloodPressure, bloodGlucose)
    pub metric_type: String,

    /// Raw value as entered by the user
    pub value: String,

    /// Display unit (e.g. mmHg)
    pub unit: String,

    /// Optional notes about the observation
    pub notes: Option<String>,

    /// RFC 3339 instant of the observation
    pub timestamp: String,
}

/// Input data for appending a metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMetricRequest {
    pub metric_type: String,
    pub value: String,
    pub unit: String,
    pub notes: Option<String>,
    /// RFC 3339 instant supplied by the caller
    pub timestamp: String,
}

impl MetricRecord {
    /// Build a record from a create request, assigning the given id
    pub fn from_request(id: String, user_id: &str, request: CreateMetricRequest) -> Self {
        Self {
            id,
            user_id: user_id.to_string(),
            metric_type: request.metric_type,
            value: request.value,
            unit: request.unit,
            notes: request.notes,
            timestamp: request.timestamp,
        }
    }
}
