// libs/appointment-cell/src/handlers.rs
use axum::{
    extract::{Path, Query, State, Extension},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use shared_database::AppState;
use shared_models::auth::User;
use shared_models::clinical::ClinicalId;
use shared_models::error::AppError;
use shared_utils::extractor::require_actor;

use crate::models::{
    AppointmentQueryParams, BookAppointmentRequest, ConflictCheckQuery, UpdateAppointmentRequest,
};
use crate::services::{AppointmentBookingService, DashboardService};

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    /// Overrides the server's current date.
    pub date: Option<NaiveDate>,
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let actor = require_actor(&user)?;
    let service = AppointmentBookingService::new(&state);

    let appointment = service.book_appointment(&actor, request)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment booked successfully"
    })))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(params): Query<AppointmentQueryParams>,
) -> Result<Json<Value>, AppError> {
    let actor = require_actor(&user)?;
    let service = AppointmentBookingService::new(&state);

    let appointments = service.list_appointments(&actor, &params)?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<ClinicalId>,
) -> Result<Json<Value>, AppError> {
    let actor = require_actor(&user)?;
    let service = AppointmentBookingService::new(&state);

    let summary = service.get_appointment(&actor, appointment_id)?;

    Ok(Json(json!(summary)))
}

#[axum::debug_handler]
pub async fn confirm_appointment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<ClinicalId>,
) -> Result<Json<Value>, AppError> {
    let actor = require_actor(&user)?;
    let service = AppointmentBookingService::new(&state);

    let appointment = service.confirm_appointment(&actor, appointment_id)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<ClinicalId>,
) -> Result<Json<Value>, AppError> {
    let actor = require_actor(&user)?;
    let service = AppointmentBookingService::new(&state);

    let appointment = service.cancel_appointment(&actor, appointment_id)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<ClinicalId>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let actor = require_actor(&user)?;
    let service = AppointmentBookingService::new(&state);

    let appointment = service.update_appointment(&actor, appointment_id, request)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn get_patient_appointments(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(patient_id): Path<ClinicalId>,
) -> Result<Json<Value>, AppError> {
    let actor = require_actor(&user)?;
    let service = AppointmentBookingService::new(&state);

    let appointments = service.patient_appointments(&actor, patient_id)?;

    Ok(Json(json!({
        "patient_id": patient_id,
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_doctor_appointments(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(doctor_id): Path<ClinicalId>,
) -> Result<Json<Value>, AppError> {
    let actor = require_actor(&user)?;
    let service = AppointmentBookingService::new(&state);

    let appointments = service.doctor_appointments(&actor, doctor_id)?;

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<Value>, AppError> {
    let actor = require_actor(&user)?;
    let today = query.date.unwrap_or_else(|| Utc::now().date_naive());

    let dashboard = DashboardService::new(&state).build(&actor, today)?;

    Ok(Json(json!(dashboard)))
}

#[axum::debug_handler]
pub async fn check_appointment_conflicts(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<ConflictCheckQuery>,
) -> Result<Json<Value>, AppError> {
    require_actor(&user)?;
    let service = AppointmentBookingService::new(&state);

    let report = service.check_conflicts(&query)?;

    Ok(Json(json!(report)))
}
