use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Risk tier assigned by the threshold table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Medium => "medium",
            RiskTier::High => "high",
        }
    }
}

/// Rule-based judgment about the most recent metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Prediction {
    /// Id of the record the prediction was derived from
    pub id: String,

    /// Display title, e.g. "bloodPressure analysis"
    pub title: String,

    pub metric_type: String,

    pub risk_tier: RiskTier,

    /// Human-readable judgment
    pub judgment: String,

    /// Fixed confidence attached to the matched rule (0-100)
    pub confidence_percent: u8,
}

/// Output of the classification engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct ClassificationReport {
    /// Zero or one prediction
    pub predictions: Vec<Prediction>,

    /// Records passed over because their value did not parse
    pub skipped_invalid: usize,
}
