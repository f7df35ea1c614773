use axum::http::{Method, StatusCode};
use serde_json::json;

use super::{bearer, request, send, test_app, TEST_EMAIL, TEST_USER};

#[tokio::test]
async fn test_profile_round_trip() {
    let app = test_app();
    let auth = bearer(TEST_USER, None);

    let (status, _) = send(&app, request(Method::GET, "/api/v1/profile", Some(&auth), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, stored) = send(&app, request(
        Method::PUT,
        "/api/v1/profile",
        Some(&auth),
        Some(json!({ "name": "Sam Rivera", "email": TEST_EMAIL, "condition": "copd" })),
    )).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["condition"], "copd");
    assert_eq!(stored["userId"], TEST_USER);

    let (status, fetched) = send(&app, request(Method::GET, "/api/v1/profile", Some(&auth), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["email"], TEST_EMAIL);
}

#[tokio::test]
async fn test_profile_validation() {
    let app = test_app();

    let (status, body) = send(&app, request(
        Method::PUT,
        "/api/v1/profile",
        Some(&bearer(TEST_USER, None)),
        Some(json!({ "name": "S", "email": "not-an-email", "condition": "ckd" })),
    )).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_catalog() {
    let app = test_app();
    let auth = bearer(TEST_USER, None);

    let (status, catalog) = send(&app, request(Method::GET, "/api/v1/catalog", Some(&auth), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(catalog.as_array().unwrap().len(), 5);

    let (status, entry) = send(&app, request(Method::GET, "/api/v1/catalog/hypertension", Some(&auth), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["metrics"][0]["metricType"], "systolic");
    assert_eq!(entry["metrics"][2]["unit"], "bpm");

    let (status, _) = send(&app, request(Method::GET, "/api/v1/catalog/asthma", Some(&auth), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
