use serde::{Deserialize, Serialize};

/// Storage model for a registered user's profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Identity-provider subject
    pub user_id: String,

    /// Display name
    pub name: String,

    /// Account email
    pub email: String,

    /// Chronic condition label (diabetes, hypertension, copd, ckd, chf)
    pub condition: String,

    /// RFC 3339 creation time
    pub created_at: String,
}
