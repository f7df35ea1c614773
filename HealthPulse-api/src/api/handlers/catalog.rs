use axum::extract::{Json, Path};

use health_pulse_domain::catalog::ConditionCatalog;
use health_pulse_domain::entities::Condition;

use crate::entities::common::ErrorResponse;

/// Metric options for every condition
#[utoipa::path(
    get,
    path = "/api/v1/catalog",
    responses(
        (status = 200, description = "Catalog of all conditions", body = Vec<ConditionCatalog>),
        (status = 401, description = "Missing or invalid bearer token"),
    ),
    security(("bearer" = [])),
    tag = "catalog"
)]
pub async fn get_catalog() -> Json<Vec<ConditionCatalog>> {
    Json(ConditionCatalog::all())
}

/// Metric options for one condition
#[utoipa::path(
    get,
    path = "/api/v1/catalog/{condition}",
    params(
        ("condition" = String, Path, description = "diabetes, hypertension, copd, ckd or chf")
    ),
    responses(
        (status = 200, description = "Catalog entry", body = ConditionCatalog),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "Unknown condition", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "catalog"
)]
pub async fn get_condition_catalog(
    Path(condition): Path<String>,
) -> Result<Json<ConditionCatalog>, ErrorResponse> {
    let condition = condition
        .parse::<Condition>()
        .map_err(|_| ErrorResponse::not_found("condition"))?;

    Ok(Json(ConditionCatalog::for_condition(condition)))
}
