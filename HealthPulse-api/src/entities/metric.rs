use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Maximum records returned by the history endpoint
pub const MAX_HISTORY_LIMIT: usize = 1000;

/// Query parameters for retrieving metric history
#[derive(Debug, Default, Deserialize, Clone, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct HistoryQueryParams {
    /// Maximum number of results, newest first (default and max: 1000)
    pub limit: Option<usize>,
}

impl HistoryQueryParams {
    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(MAX_HISTORY_LIMIT).min(MAX_HISTORY_LIMIT)
    }
}

/// Confirmation required to wipe a user's history
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetHistoryRequest {
    /// Must match the account email
    #[serde(alias = "confirm_email")]
    pub confirm_email: String,
}

/// Result of a history wipe
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetHistoryResponse {
    pub deleted: usize,
}
