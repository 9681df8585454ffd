use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use shared_database::AppState;
use shared_models::clinical::ClinicalId;
use shared_models::error::AppError;

use crate::models::{AvailabilityQuery, DoctorSearchFilters};
use crate::services::{AvailabilityService, DoctorService};

#[derive(Debug, Deserialize)]
pub struct SlotBoardQuery {
    pub date: Option<NaiveDate>,
}

pub async fn search_doctors(
    State(state): State<AppState>,
    Query(filters): Query<DoctorSearchFilters>,
) -> Json<Value> {
    let doctors = DoctorService::new(&state).search_doctors(&filters);

    Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    }))
}

pub async fn get_doctor(
    State(state): State<AppState>,
    Path(doctor_id): Path<ClinicalId>,
) -> Result<Json<Value>, AppError> {
    let doctor = DoctorService::new(&state).get_doctor(doctor_id)?;

    Ok(Json(json!(doctor)))
}

pub async fn get_slot_board(
    State(state): State<AppState>,
    Path(doctor_id): Path<ClinicalId>,
    Query(query): Query<SlotBoardQuery>,
) -> Result<Json<Value>, AppError> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let board = AvailabilityService::new(&state).slot_board(doctor_id, date)?;

    Ok(Json(json!(board)))
}

pub async fn find_available_doctors(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let doctors = AvailabilityService::new(&state).available_doctors(&query)?;

    Ok(Json(json!({
        "date": query.date,
        "doctors": doctors,
        "total": doctors.len()
    })))
}
