use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Extension, Router,
    routing::get,
};
use tower::ServiceExt;

use health_pulse_domain::health::{ComponentStatus, HealthServiceTrait};
use health_pulse_domain::testing::MockHealthService;

use crate::api::handlers::health::{health_check, initialize_server_start_time};

fn app(service: MockHealthService) -> Router {
    initialize_server_start_time();
    let service: Arc<dyn HealthServiceTrait> = Arc::new(service);
    Router::new()
        .route("/health", get(health_check))
        .layer(Extension(service))
}

async fn call(service: MockHealthService) -> (StatusCode, serde_json::Value) {
    let response = app(service)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_health_check_healthy() {
    let (status, body) = call(MockHealthService::new()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["components"]["database"]["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_health_check_degraded_database() {
    let (status, body) = call(MockHealthService::new().with_degraded_database()).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["components"]["database"]["message"], "Metrics are held in memory");
}

#[tokio::test]
async fn test_health_check_unhealthy_component() {
    let service = MockHealthService::new()
        .with_component("disk", ComponentStatus::Unhealthy, Some("read-only".to_string()));
    let (status, body) = call(service).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["components"]["disk"]["status"], "error");
}

#[tokio::test]
async fn test_unhealthy_database() {
    let (status, _) = call(MockHealthService::new().with_unhealthy_database()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
