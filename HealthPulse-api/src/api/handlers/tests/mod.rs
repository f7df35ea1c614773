mod health_test;
mod profile_test;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Duration;
use tower::ServiceExt;

use health_pulse_domain::auth::token::generate_token;
use health_pulse_domain::auth::TokenConfig;
use health_pulse_domain::testing::{in_memory_metric_service, in_memory_profile_service, MockHealthService};

use crate::api::routes::{create_router, AppState};

pub const TEST_USER: &str = "user-1";
pub const TEST_EMAIL: &str = "sam@example.com";

pub fn token_config() -> TokenConfig {
    TokenConfig::new("handler-test-secret", "health-pulse-idp")
}

/// Router over fresh in-memory services
pub fn test_app() -> Router {
    let state = AppState {
        metrics: Arc::new(in_memory_metric_service()),
        profiles: Arc::new(in_memory_profile_service()),
        tokens: Arc::new(token_config()),
    };
    create_router(state, Arc::new(MockHealthService::new()))
}

pub fn bearer(user_id: &str, email: Option<&str>) -> String {
    let token = generate_token(&token_config(), user_id, email, Duration::minutes(5)).unwrap();
    format!("Bearer {}", token)
}

pub fn request(method: Method, uri: &str, auth: Option<&str>, body: Option<serde_json::Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Send a request through a clone of the router and decode the JSON body
pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
