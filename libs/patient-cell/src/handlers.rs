use axum::{
    extract::{Path, Query, State, Extension},
    Json,
};
use serde_json::{json, Value};

use shared_database::AppState;
use shared_models::auth::User;
use shared_models::clinical::ClinicalId;
use shared_models::error::AppError;
use shared_utils::extractor::require_actor;

use crate::models::{CreatePatientRequest, PatientSearchQuery};
use crate::services::PatientService;

#[axum::debug_handler]
pub async fn create_patient(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<CreatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    let actor = require_actor(&user)?;
    let service = PatientService::new(&state);

    let patient = service.create_patient(&actor, request)?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(patient_id): Path<ClinicalId>,
) -> Result<Json<Value>, AppError> {
    let actor = require_actor(&user)?;
    let service = PatientService::new(&state);

    let patient = service.get_patient(&actor, patient_id)?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn search_patients(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<PatientSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let actor = require_actor(&user)?;
    let service = PatientService::new(&state);

    let patients = service.search_patients(&actor, &query)?;

    Ok(Json(json!({
        "patients": patients,
        "total": patients.len()
    })))
}

#[axum::debug_handler]
pub async fn get_patient_records(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(patient_id): Path<ClinicalId>,
) -> Result<Json<Value>, AppError> {
    let actor = require_actor(&user)?;
    let service = PatientService::new(&state);

    let records = service.patient_records(&actor, patient_id)?;

    Ok(Json(json!(records)))
}
