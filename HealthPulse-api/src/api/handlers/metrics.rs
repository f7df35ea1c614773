use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension,
};
use tracing::{info, instrument, warn};

use health_pulse_domain::auth::AuthenticatedUser;
use health_pulse_domain::entities::{
    ClassificationReport, CreateMetricRequest, HealthScore, MetricRecord, TrendReport,
};
use health_pulse_domain::services::RecentMetric;

use crate::api::routes::AppState;
use crate::entities::common::ErrorResponse;
use crate::entities::metric::{HistoryQueryParams, ResetHistoryRequest, ResetHistoryResponse};

/// Log a new health metric
#[utoipa::path(
    post,
    path = "/api/v1/metrics",
    request_body = CreateMetricRequest,
    responses(
        (status = 201, description = "Metric logged", body = MetricRecord),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "metrics"
)]
#[instrument(skip(state, request), fields(user_id = %user.user_id))]
pub async fn create_metric(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateMetricRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let record = state.metrics.log_metric(&user.user_id, request).await?;
    info!("Logged {} metric {}", record.metric_type, record.id);

    Ok((StatusCode::CREATED, Json(record)))
}

/// Get metric history, newest first
#[utoipa::path(
    get,
    path = "/api/v1/metrics",
    params(HistoryQueryParams),
    responses(
        (status = 200, description = "Metric history", body = Vec<MetricRecord>),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "metrics"
)]
#[instrument(skip(state), fields(user_id = %user.user_id))]
pub async fn get_metric_history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(params): Query<HistoryQueryParams>,
) -> Result<Json<Vec<MetricRecord>>, ErrorResponse> {
    let records = state.metrics
        .get_history(&user.user_id, Some(params.effective_limit()))
        .await?;

    Ok(Json(records))
}

/// Get the latest metrics with display dates
#[utoipa::path(
    get,
    path = "/api/v1/metrics/recent",
    responses(
        (status = 200, description = "Latest five metrics", body = Vec<RecentMetric>),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "metrics"
)]
#[instrument(skip(state), fields(user_id = %user.user_id))]
pub async fn get_recent_metrics(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<RecentMetric>>, ErrorResponse> {
    Ok(Json(state.metrics.get_recent_metrics(&user.user_id).await?))
}

/// Classify the most recent metric
#[utoipa::path(
    get,
    path = "/api/v1/metrics/predictions",
    responses(
        (status = 200, description = "Zero or one prediction", body = ClassificationReport),
        (status = 401, description = "Missing or invalid bearer token"),
    ),
    security(("bearer" = [])),
    tag = "metrics"
)]
#[instrument(skip(state), fields(user_id = %user.user_id))]
pub async fn get_predictions(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Json<ClassificationReport> {
    Json(state.metrics.get_predictions(&user.user_id).await)
}

/// Chart series grouped by metric type
#[utoipa::path(
    get,
    path = "/api/v1/metrics/trends",
    responses(
        (status = 200, description = "Series keyed by metric type", body = TrendReport),
        (status = 401, description = "Missing or invalid bearer token"),
    ),
    security(("bearer" = [])),
    tag = "metrics"
)]
#[instrument(skip(state), fields(user_id = %user.user_id))]
pub async fn get_trends(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Json<TrendReport> {
    Json(state.metrics.get_trends(&user.user_id).await)
}

/// Composite health score over the recent window
#[utoipa::path(
    get,
    path = "/api/v1/metrics/health-score",
    responses(
        (status = 200, description = "Health score and risk level", body = HealthScore),
        (status = 401, description = "Missing or invalid bearer token"),
    ),
    security(("bearer" = [])),
    tag = "metrics"
)]
#[instrument(skip(state), fields(user_id = %user.user_id))]
pub async fn get_health_score(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Json<HealthScore> {
    Json(state.metrics.get_health_score(&user.user_id).await)
}

/// Irreversibly delete the caller's metric history
#[utoipa::path(
    delete,
    path = "/api/v1/metrics",
    request_body = ResetHistoryRequest,
    responses(
        (status = 200, description = "History deleted", body = ResetHistoryResponse),
        (status = 400, description = "Confirmation email does not match", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "metrics"
)]
#[instrument(skip(state, request), fields(user_id = %user.user_id))]
pub async fn reset_metrics(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<ResetHistoryRequest>,
) -> Result<Json<ResetHistoryResponse>, ErrorResponse> {
    // Token claim first, registration profile second
    let account_email = match user.email.clone() {
        Some(email) => email,
        None => match state.profiles.get_profile(&user.user_id).await {
            Ok(profile) => profile.email,
            Err(e) => {
                warn!("No account email available for reset: {}", e);
                return Err(ErrorResponse::bad_request(
                    "No account email on record to confirm against",
                ));
            }
        },
    };

    let deleted = state.metrics
        .reset_history(&user.user_id, &request.confirm_email, &account_email)
        .await?;

    Ok(Json(ResetHistoryResponse { deleted }))
}
