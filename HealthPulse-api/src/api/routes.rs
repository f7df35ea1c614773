use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, put},
    Extension, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use health_pulse_domain::auth::{auth_middleware, SecurityError, TokenConfig};
use health_pulse_domain::health::HealthServiceTrait;
use health_pulse_domain::services::{
    create_default_metric_service, create_default_profile_service, MetricServiceTrait, ProfileServiceTrait,
};

use crate::api::handlers::{catalog, dashboard, health, metrics, profile};
use crate::openapi::configure_swagger_routes;

/// Shared state for the protected routes
#[derive(Clone)]
pub struct AppState {
    pub metrics: Arc<dyn MetricServiceTrait>,
    pub profiles: Arc<dyn ProfileServiceTrait>,
    pub tokens: Arc<TokenConfig>,
}

impl AppState {
    /// State backed by the global database pool, falling back to memory
    pub fn from_env() -> Result<Self, SecurityError> {
        let tokens = TokenConfig::from_env()?;
        info!("Accepting bearer tokens issued by {}", tokens.issuer());

        Ok(Self {
            metrics: Arc::new(create_default_metric_service()),
            profiles: Arc::new(create_default_profile_service()),
            tokens: Arc::new(tokens),
        })
    }
}

/// Create the application router from the environment
pub fn create_app() -> Result<Router, SecurityError> {
    let state = AppState::from_env()?;
    Ok(create_router(state, health::create_health_service()))
}

/// Assemble the router around the given state
pub fn create_router(state: AppState, health_service: Arc<dyn HealthServiceTrait>) -> Router {
    debug!("Creating application router");

    // Specific routes before parametrized ones
    let api_routes = Router::new()
        .route("/metrics", get(metrics::get_metric_history)
                           .post(metrics::create_metric)
                           .delete(metrics::reset_metrics))
        .route("/metrics/recent", get(metrics::get_recent_metrics))
        .route("/metrics/predictions", get(metrics::get_predictions))
        .route("/metrics/trends", get(metrics::get_trends))
        .route("/metrics/health-score", get(metrics::get_health_score))
        .route("/dashboard", get(dashboard::get_dashboard))
        .route("/dashboard/stream", get(dashboard::stream_dashboard))
        .route("/profile", put(profile::put_profile).get(profile::get_profile))
        .route("/catalog", get(catalog::get_catalog))
        .route("/catalog/:condition", get(catalog::get_condition_catalog))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state.tokens),
            auth_middleware,
        ))
        .with_state(state);

    debug!("API routes configured");

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .layer(Extension(health_service));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    health::initialize_server_start_time();

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .merge(configure_swagger_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
