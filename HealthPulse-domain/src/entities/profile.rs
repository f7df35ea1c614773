use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Chronic condition a user registers with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub enum Condition {
    Diabetes,
    Hypertension,
    Copd,
    Ckd,
    Chf,
}

impl Condition {
    pub const ALL: [Condition; 5] = [
        Condition::Diabetes,
        Condition::Hypertension,
        Condition::Copd,
        Condition::Ckd,
        Condition::Chf,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Diabetes => "diabetes",
            Condition::Hypertension => "hypertension",
            Condition::Copd => "copd",
            Condition::Ckd => "ckd",
            Condition::Chf => "chf",
        }
    }

    /// Long display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Condition::Diabetes => "Diabetes",
            Condition::Hypertension => "Hypertension",
            Condition::Copd => "Chronic Obstructive Pulmonary Disease",
            Condition::Ckd => "Chronic Kidney Disease",
            Condition::Chf => "Congestive Heart Failure",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized condition label
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown condition: {0}")]
pub struct UnknownCondition(pub String);

impl FromStr for Condition {
    type Err = UnknownCondition;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Condition::ALL
            .into_iter()
            .find(|condition| condition.as_str() == normalized)
            .ok_or_else(|| UnknownCondition(s.to_string()))
    }
}

/// Registration profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct UserProfile {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub condition: Condition,
    pub created_at: DateTime<Utc>,
}

/// Request payload for registering or updating a profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct RegisterProfileRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: String,

    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,

    pub condition: Condition,
}
