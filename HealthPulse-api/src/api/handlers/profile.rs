use axum::{
    extract::{Json, State},
    Extension,
};
use tracing::instrument;

use health_pulse_domain::auth::AuthenticatedUser;
use health_pulse_domain::entities::{RegisterProfileRequest, UserProfile};

use crate::api::routes::AppState;
use crate::entities::common::ErrorResponse;

/// Register or update the caller's profile
#[utoipa::path(
    put,
    path = "/api/v1/profile",
    request_body = RegisterProfileRequest,
    responses(
        (status = 200, description = "Profile stored", body = UserProfile),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token"),
    ),
    security(("bearer" = [])),
    tag = "profile"
)]
#[instrument(skip(state, request), fields(user_id = %user.user_id))]
pub async fn put_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<RegisterProfileRequest>,
) -> Result<Json<UserProfile>, ErrorResponse> {
    Ok(Json(state.profiles.register(&user.user_id, request).await?))
}

/// Get the caller's profile
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    responses(
        (status = 200, description = "Profile", body = UserProfile),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "No profile registered", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "profile"
)]
#[instrument(skip(state), fields(user_id = %user.user_id))]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<UserProfile>, ErrorResponse> {
    Ok(Json(state.profiles.get_profile(&user.user_id).await?))
}
