use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt;
use serde_json::Value;

use doctor_cell::router::doctor_routes;
use shared_utils::test_utils::TestConfig;

fn create_test_app() -> Router {
    doctor_routes(TestConfig::default().to_state())
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_catalog_lists_seeded_doctors() {
    let app = create_test_app();

    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);

    let (status, body) = get(&app, "/?specialization=pediatrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["doctors"][0]["name"], "Dr. Emily Davis");
}

#[tokio::test]
async fn test_get_doctor_and_missing_doctor() {
    let app = create_test_app();

    let (status, body) = get(&app, "/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available_slots"][0], "09:00");

    let (status, body) = get(&app, "/44").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Doctor not found");
}

#[tokio::test]
async fn test_slot_board_marks_taken_slot() {
    let app = create_test_app();

    let (status, body) = get(&app, "/1/slots?date=2025-08-10").await;

    assert_eq!(status, StatusCode::OK);
    let slots = body["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 6);
    let taken: Vec<&Value> = slots.iter().filter(|s| s["booked"] == true).collect();
    assert_eq!(taken.len(), 1);
    assert_eq!(taken[0]["time"], "10:00");
}

#[tokio::test]
async fn test_available_doctors_on_date() {
    let app = create_test_app();

    let (status, body) = get(&app, "/available?date=2025-08-10&specialization=Cardiology").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["doctors"][0]["free_slots"].as_array().unwrap().len(), 5);
}
