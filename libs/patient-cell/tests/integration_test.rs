use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt;
use serde_json::{json, Value};

use patient_cell::router::create_patient_router;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

fn create_test_app(test_config: &TestConfig) -> Router {
    create_patient_router(test_config.to_state())
}

async fn send(app: &Router, method: &str, uri: &str, user: &TestUser, body: Option<Value>) -> (StatusCode, Value) {
    let config = TestConfig::default();
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", JwtTestUtils::bearer(user, &config))
        .header("content-type", "application/json")
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_receptionist_intake_then_search() {
    let app = create_test_app(&TestConfig::default());
    let desk = TestUser::receptionist();

    let (status, created) = send(
        &app,
        "POST",
        "/",
        &desk,
        Some(json!({
            "name": "Jane Roe",
            "email": "jane@example.com",
            "phone": "+1-555-0100",
            "date_of_birth": "1985-03-02"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["email"], "jane@example.com");

    let (status, found) = send(&app, "GET", "/?name=ROE", &desk, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["total"], 1);
    assert_eq!(found["patients"][0]["id"], created["id"]);
}

#[tokio::test]
async fn test_duplicate_intake_conflicts() {
    let app = create_test_app(&TestConfig::default());

    let (status, body) = send(
        &app,
        "POST",
        "/",
        &TestUser::receptionist(),
        Some(json!({ "name": "John Again", "email": "patient@hospital.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Patient with email patient@hospital.com already exists");
}

#[tokio::test]
async fn test_patient_sees_only_own_chart() {
    let app = create_test_app(&TestConfig::default());

    let (status, records) = send(&app, "GET", "/1/records", &TestUser::patient(1), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(records["patient"]["name"], "John Doe");
    assert_eq!(records["appointments"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "GET", "/1", &TestUser::patient(2), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "GET", "/", &TestUser::patient(1), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_doctor_views_any_patient() {
    let app = create_test_app(&TestConfig::default());

    let (status, patient) = send(&app, "GET", "/1", &TestUser::doctor(2), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patient["email"], "patient@hospital.com");

    let (status, _) = send(&app, "GET", "/404", &TestUser::doctor(2), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
