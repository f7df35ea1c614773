use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
}

/// Registers the bearer scheme referenced by protected paths
struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::api::handlers::health::health_check,

        // Metric endpoints
        crate::api::handlers::metrics::create_metric,
        crate::api::handlers::metrics::get_metric_history,
        crate::api::handlers::metrics::get_recent_metrics,
        crate::api::handlers::metrics::get_predictions,
        crate::api::handlers::metrics::get_trends,
        crate::api::handlers::metrics::get_health_score,
        crate::api::handlers::metrics::reset_metrics,

        // Dashboard endpoints
        crate::api::handlers::dashboard::get_dashboard,
        crate::api::handlers::dashboard::stream_dashboard,

        // Profile and catalog endpoints
        crate::api::handlers::profile::put_profile,
        crate::api::handlers::profile::get_profile,
        crate::api::handlers::catalog::get_catalog,
        crate::api::handlers::catalog::get_condition_catalog
    ),
    components(
        schemas(
            // Domain entities
            health_pulse_domain::entities::MetricRecord,
            health_pulse_domain::entities::CreateMetricRequest,
            health_pulse_domain::entities::Prediction,
            health_pulse_domain::entities::RiskTier,
            health_pulse_domain::entities::ClassificationReport,
            health_pulse_domain::entities::HealthScore,
            health_pulse_domain::entities::RiskLevel,
            health_pulse_domain::entities::TrendPoint,
            health_pulse_domain::entities::TrendReport,
            health_pulse_domain::entities::Condition,
            health_pulse_domain::entities::UserProfile,
            health_pulse_domain::entities::RegisterProfileRequest,
            health_pulse_domain::services::RecentMetric,
            health_pulse_domain::services::DashboardView,
            health_pulse_domain::catalog::MetricOption,
            health_pulse_domain::catalog::ConditionCatalog,

            // API entities
            crate::entities::common::ErrorResponse,
            crate::entities::metric::HistoryQueryParams,
            crate::entities::metric::ResetHistoryRequest,
            crate::entities::metric::ResetHistoryResponse,

            // Health handlers
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentHealthStatus
        )
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "metrics", description = "Metric logging, history and derived views"),
        (name = "dashboard", description = "Dashboard snapshot and live updates"),
        (name = "profile", description = "Registration profile"),
        (name = "catalog", description = "Metric options per chronic condition")
    ),
    info(
        title = "HealthPulse API",
        version = "0.1.0",
        description = "Health metric logging with rule-based predictions, trends and a composite health score",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;
