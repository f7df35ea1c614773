use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Overall risk level derived from the health score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    NoData,
}

impl RiskLevel {
    /// Map a score onto a risk level: above 80 is low, above 60 is medium
    pub fn from_score(score: u8) -> Self {
        if score > 80 {
            RiskLevel::Low
        } else if score > 60 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

/// Composite health score over the recent window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct HealthScore {
    /// 0-100, absent when there is nothing to assess
    pub score: Option<u8>,

    pub risk_level: RiskLevel,

    /// Number of records that contributed to the score
    pub assessed_count: usize,

    /// Records in the window whose value did not parse
    pub skipped_invalid: usize,
}

impl HealthScore {
    pub fn no_data(skipped_invalid: usize) -> Self {
        Self {
            score: None,
            risk_level: RiskLevel::NoData,
            assessed_count: 0,
            skipped_invalid,
        }
    }
}
