// libs/prescription-cell/src/handlers.rs
use axum::{
    extract::{Path, State, Extension},
    Json,
};
use serde_json::{json, Value};

use shared_database::AppState;
use shared_models::auth::User;
use shared_models::clinical::ClinicalId;
use shared_models::error::AppError;
use shared_utils::extractor::require_actor;

use crate::models::IssuePrescriptionRequest;
use crate::services::PrescriptionService;

#[axum::debug_handler]
pub async fn issue_prescription(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<IssuePrescriptionRequest>,
) -> Result<Json<Value>, AppError> {
    let actor = require_actor(&user)?;
    let service = PrescriptionService::new(&state);

    let issued = service.issue(&actor, request)?;

    Ok(Json(json!({
        "success": true,
        "prescription": issued.prescription,
        "appointment": issued.appointment,
        "message": "Prescription issued and appointment completed"
    })))
}

#[axum::debug_handler]
pub async fn get_prescription(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(prescription_id): Path<ClinicalId>,
) -> Result<Json<Value>, AppError> {
    let actor = require_actor(&user)?;
    let prescription = PrescriptionService::new(&state).get_prescription(&actor, prescription_id)?;

    Ok(Json(json!(prescription)))
}

#[axum::debug_handler]
pub async fn get_patient_prescriptions(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(patient_id): Path<ClinicalId>,
) -> Result<Json<Value>, AppError> {
    let actor = require_actor(&user)?;
    let prescriptions = PrescriptionService::new(&state).patient_prescriptions(&actor, patient_id)?;

    Ok(Json(json!({
        "patient_id": patient_id,
        "prescriptions": prescriptions,
        "total": prescriptions.len()
    })))
}

pub async fn list_medicines(State(state): State<AppState>) -> Json<Value> {
    let medicines = PrescriptionService::new(&state).list_medicines();

    Json(json!({
        "medicines": medicines,
        "total": medicines.len()
    }))
}

pub async fn get_medicine(
    State(state): State<AppState>,
    Path(medicine_id): Path<ClinicalId>,
) -> Result<Json<Value>, AppError> {
    let medicine = PrescriptionService::new(&state).get_medicine(medicine_id)?;

    Ok(Json(json!(medicine)))
}
