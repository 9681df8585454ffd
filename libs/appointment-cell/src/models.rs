// libs/appointment-cell/src/models.rs
use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use shared_models::clinical::{ClinicalId, Prescription, SlotTime};
use shared_models::error::AppError;

pub use shared_models::clinical::{Appointment, AppointmentPatch, AppointmentStatus};

// ==============================================================================
// LIFECYCLE
// ==============================================================================

/// Named operations that move an appointment through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    Confirm,
    Cancel,
    Complete,
    Reschedule,
}

impl LifecycleAction {
    pub fn target_status(&self) -> AppointmentStatus {
        match self {
            LifecycleAction::Confirm => AppointmentStatus::Confirmed,
            LifecycleAction::Cancel => AppointmentStatus::Cancelled,
            LifecycleAction::Complete => AppointmentStatus::Completed,
            LifecycleAction::Reschedule => AppointmentStatus::Scheduled,
        }
    }
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleAction::Confirm => write!(f, "confirm"),
            LifecycleAction::Cancel => write!(f, "cancel"),
            LifecycleAction::Complete => write!(f, "complete"),
            LifecycleAction::Reschedule => write!(f, "reschedule"),
        }
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    /// Defaults to the booking patient when omitted.
    #[serde(default)]
    pub patient_id: Option<ClinicalId>,
    pub doctor_id: ClinicalId,
    pub date: NaiveDate,
    pub time: SlotTime,
    #[serde(default)]
    pub reason: String,
}

/// Front-desk edit of an appointment's booking details.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub patient_id: Option<ClinicalId>,
    pub doctor_id: Option<ClinicalId>,
    pub date: Option<NaiveDate>,
    pub time: Option<SlotTime>,
    pub reason: Option<String>,
    /// Only honoured under the permissive lifecycle policy.
    pub status: Option<AppointmentStatus>,
}

impl UpdateAppointmentRequest {
    pub fn is_empty(&self) -> bool {
        self.patient_id.is_none()
            && self.doctor_id.is_none()
            && self.date.is_none()
            && self.time.is_none()
            && self.reason.is_none()
            && self.status.is_none()
    }

    /// Whether the edit touches the doctor, date, or time of the booking.
    pub fn moves_slot(&self) -> bool {
        self.doctor_id.is_some() || self.date.is_some() || self.time.is_some()
    }

    pub fn into_patch(self) -> AppointmentPatch {
        AppointmentPatch {
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
            date: self.date,
            time: self.time,
            reason: self.reason,
            status: self.status,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentQueryParams {
    pub status: Option<AppointmentStatus>,
    pub date: Option<NaiveDate>,
}

impl AppointmentQueryParams {
    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.status.map_or(true, |s| appointment.status == s)
            && self.date.map_or(true, |d| appointment.date == d)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictCheckQuery {
    pub doctor_id: ClinicalId,
    pub date: NaiveDate,
    pub time: SlotTime,
    pub exclude_appointment_id: Option<ClinicalId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictCheckResponse {
    pub has_conflict: bool,
    pub slot_offered: bool,
    pub conflicting_appointments: Vec<Appointment>,
}

/// Appointment with the names a dashboard row displays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentSummary {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub patient_name: Option<String>,
    pub doctor_name: Option<String>,
    pub available_actions: Vec<LifecycleAction>,
}

// ==============================================================================
// DASHBOARDS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientDashboard {
    pub patient_id: ClinicalId,
    pub upcoming: Vec<AppointmentSummary>,
    pub history: Vec<AppointmentSummary>,
    pub prescriptions: Vec<Prescription>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorDashboard {
    pub doctor_id: ClinicalId,
    pub today: Vec<AppointmentSummary>,
    pub pending: Vec<AppointmentSummary>,
    pub confirmed: Vec<AppointmentSummary>,
    pub completed_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceptionistDashboard {
    pub today: Vec<AppointmentSummary>,
    pub total_patients: usize,
    pub total_appointments: usize,
    pub by_status: BTreeMap<AppointmentStatus, usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Dashboard {
    Patient(PatientDashboard),
    Doctor(DoctorDashboard),
    Receptionist(ReceptionistDashboard),
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Patient not found")]
    PatientNotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Cannot {action} an appointment that is {from}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        action: LifecycleAction,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Doctor {doctor_id} does not offer the {time} slot")]
    SlotNotOffered { doctor_id: ClinicalId, time: SlotTime },

    #[error("Appointment conflicts with existing booking")]
    ConflictDetected,

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound
            | AppointmentError::PatientNotFound
            | AppointmentError::DoctorNotFound => AppError::NotFound(err.to_string()),
            AppointmentError::InvalidStatusTransition { .. } | AppointmentError::ConflictDetected => {
                AppError::Conflict(err.to_string())
            }
            AppointmentError::Unauthorized(msg) => AppError::Forbidden(msg),
            AppointmentError::SlotNotOffered { .. } | AppointmentError::ValidationError(_) => {
                AppError::ValidationError(err.to_string())
            }
        }
    }
}
