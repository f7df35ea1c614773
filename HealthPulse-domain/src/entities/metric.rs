use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Domain model for a single health observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct MetricRecord {
    /// Unique identifier assigned by the store
    pub id: String,

    /// Metric type tag (e.g. bloodPressure, bloodGlucose, heartRate)
    pub metric_type: String,

    /// Value as entered; parsed on read
    pub value: String,

    /// Display unit, informational only
    pub unit: String,

    /// Optional notes about the observation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// When the observation was taken
    pub timestamp: DateTime<Utc>,
}

impl MetricRecord {
    /// Parse the stored value, rejecting anything that is not a finite number
    pub fn parsed_value(&self) -> Result<f64, InvalidValue> {
        parse_metric_value(&self.value)
    }
}

/// A metric value that does not parse to a finite number
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid metric value: {raw:?}")]
pub struct InvalidValue {
    pub raw: String,
}

/// Parse a raw metric value.
///
/// Surrounding whitespace is ignored. `NaN` and infinities are rejected, as
/// is any trailing text (`"120/80"`, `"98%"`).
pub fn parse_metric_value(raw: &str) -> Result<f64, InvalidValue> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(InvalidValue { raw: raw.to_string() }),
    }
}

/// Request payload for logging a new metric
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CreateMetricRequest {
    /// Metric type tag
    #[validate(length(min = 1, max = 64, message = "Metric type must be between 1 and 64 characters"))]
    pub metric_type: String,

    /// Measured value
    #[validate(length(min = 1, max = 32, message = "Value must be between 1 and 32 characters"))]
    pub value: String,

    /// Display unit. Looked up in the condition catalog when omitted.
    #[validate(length(max = 32, message = "Unit cannot exceed 32 characters"))]
    pub unit: Option<String>,

    /// Optional notes about the observation
    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,

    /// When the observation was taken. Defaults to the current time.
    pub timestamp: Option<DateTime<Utc>>,
}
