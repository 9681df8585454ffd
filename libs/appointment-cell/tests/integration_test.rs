use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt;
use serde_json::{json, Value};

use appointment_cell::router::appointment_routes;
use shared_database::AppState;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

fn create_test_app(test_config: &TestConfig) -> (AppState, Router) {
    let state = test_config.to_state();
    (state.clone(), appointment_routes(state))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    auth: Option<String>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    let body = body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty);

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn booking_body() -> Value {
    json!({
        "doctor_id": 1,
        "date": "2025-09-01",
        "time": "09:00",
        "reason": "Annual physical"
    })
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let config = TestConfig::default();
    let (_, app) = create_test_app(&config);

    let (status, body) = send(&app, "POST", "/", None, Some(booking_body())).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Missing authorization header");
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let config = TestConfig::default();
    let (_, app) = create_test_app(&config);
    let user = TestUser::patient(1);
    let token = JwtTestUtils::create_expired_token(&user, &config.jwt_secret);

    let (status, _) = send(&app, "GET", "/dashboard", Some(format!("Bearer {}", token)), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_token_is_rejected() {
    let config = TestConfig::default();
    let (_, app) = create_test_app(&config);
    let token = JwtTestUtils::create_malformed_token();

    let (status, _) = send(&app, "GET", "/dashboard", Some(format!("Bearer {}", token)), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_patient_books_appointment() {
    let config = TestConfig::default();
    let (state, app) = create_test_app(&config);
    let patient = TestUser::patient(1);

    let (status, body) = send(&app, "POST", "/", Some(JwtTestUtils::bearer(&patient, &config)), Some(booking_body())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["appointment"]["status"], "scheduled");
    assert_eq!(body["appointment"]["patient_id"], 1);
    assert_eq!(body["appointment"]["time"], "09:00");

    let id = body["appointment"]["id"].as_u64().unwrap();
    assert!(state.store.get_appointment(id).is_some());
}

#[tokio::test]
async fn test_full_visit_lifecycle_over_http() {
    let config = TestConfig::default();
    let (_, app) = create_test_app(&config);
    let patient = JwtTestUtils::bearer(&TestUser::patient(1), &config);
    let doctor = JwtTestUtils::bearer(&TestUser::doctor(1), &config);

    let (_, booked) = send(&app, "POST", "/", Some(patient.clone()), Some(booking_body())).await;
    let id = booked["appointment"]["id"].as_u64().unwrap();

    let (status, confirmed) = send(&app, "POST", &format!("/{}/confirm", id), Some(doctor.clone()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(confirmed["appointment"]["status"], "confirmed");

    let (status, cancelled) = send(&app, "POST", &format!("/{}/cancel", id), Some(patient.clone()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["appointment"]["status"], "cancelled");

    // Cancelling again is harmless.
    let (status, again) = send(&app, "POST", &format!("/{}/cancel", id), Some(patient), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["appointment"]["status"], "cancelled");

    // Terminal: confirming now conflicts with the lifecycle.
    let (status, body) = send(&app, "POST", &format!("/{}/confirm", id), Some(doctor), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Cannot confirm an appointment that is cancelled");
}

#[tokio::test]
async fn test_permissive_policy_allows_confirm_after_cancel() {
    let config = TestConfig::permissive();
    let (_, app) = create_test_app(&config);
    let desk = JwtTestUtils::bearer(&TestUser::receptionist(), &config);

    let mut body = booking_body();
    body["patient_id"] = json!(1);
    let (_, booked) = send(&app, "POST", "/", Some(desk.clone()), Some(body)).await;
    let id = booked["appointment"]["id"].as_u64().unwrap();

    send(&app, "POST", &format!("/{}/cancel", id), Some(desk.clone()), None).await;
    let (status, confirmed) = send(&app, "POST", &format!("/{}/confirm", id), Some(desk), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(confirmed["appointment"]["status"], "confirmed");
}

#[tokio::test]
async fn test_patient_cannot_confirm() {
    let config = TestConfig::default();
    let (_, app) = create_test_app(&config);
    let patient = JwtTestUtils::bearer(&TestUser::patient(1), &config);

    let (status, _) = send(&app, "POST", "/1/confirm", Some(patient), None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_appointment_is_not_found() {
    let config = TestConfig::default();
    let (_, app) = create_test_app(&config);
    let desk = JwtTestUtils::bearer(&TestUser::receptionist(), &config);

    let (status, _) = send(&app, "POST", "/987654/cancel", Some(desk), None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_receptionist_reschedules_and_lists() {
    let config = TestConfig::default();
    let (_, app) = create_test_app(&config);
    let desk = JwtTestUtils::bearer(&TestUser::receptionist(), &config);

    let (status, moved) = send(
        &app,
        "PUT",
        "/1",
        Some(desk.clone()),
        Some(json!({ "date": "2025-09-03", "time": "11:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["appointment"]["date"], "2025-09-03");
    assert_eq!(moved["appointment"]["status"], "scheduled");

    let (status, listing) = send(&app, "GET", "/?date=2025-09-03", Some(desk.clone()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["total"], 1);

    let (status, _) = send(&app, "PUT", "/1", Some(desk), Some(json!({ "status": "completed" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_patient_query_returns_insertion_order() {
    let config = TestConfig::default();
    let (_, app) = create_test_app(&config);
    let patient = JwtTestUtils::bearer(&TestUser::patient(1), &config);

    let (_, booked) = send(&app, "POST", "/", Some(patient.clone()), Some(booking_body())).await;
    let new_id = booked["appointment"]["id"].clone();

    let (status, body) = send(&app, "GET", "/patients/1", Some(patient.clone()), None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<Value> = body["appointments"].as_array().unwrap().iter().map(|a| a["id"].clone()).collect();
    assert_eq!(ids, vec![json!(1), new_id]);

    let (status, _) = send(&app, "GET", "/patients/2", Some(patient), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_doctor_dashboard_for_given_date() {
    let config = TestConfig::default();
    let (_, app) = create_test_app(&config);
    let doctor = JwtTestUtils::bearer(&TestUser::doctor(1), &config);

    let (status, body) = send(&app, "GET", "/dashboard?date=2025-08-10", Some(doctor), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "doctor");
    assert_eq!(body["today"].as_array().unwrap().len(), 1);
    assert_eq!(body["today"][0]["patient_name"], "John Doe");
}

#[tokio::test]
async fn test_conflict_check_reports_taken_slot() {
    let config = TestConfig::default();
    let (_, app) = create_test_app(&config);
    let desk = JwtTestUtils::bearer(&TestUser::receptionist(), &config);

    let (status, body) = send(
        &app,
        "GET",
        "/conflicts/check?doctor_id=1&date=2025-08-10&time=10:00",
        Some(desk),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["has_conflict"], true);
    assert_eq!(body["slot_offered"], true);
}
