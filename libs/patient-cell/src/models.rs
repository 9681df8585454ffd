use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use shared_models::clinical::{Appointment, NewPatient, Prescription};
use shared_models::error::AppError;

pub use shared_models::clinical::Patient;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePatientRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub address: Option<String>,
}

impl CreatePatientRequest {
    /// Trimmed record with the email lower-cased.
    pub fn into_new_patient(self) -> NewPatient {
        let optional = |value: Option<String>| {
            value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        };

        NewPatient {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            phone: self.phone.trim().to_string(),
            date_of_birth: self.date_of_birth,
            gender: optional(self.gender),
            address: optional(self.address),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientSearchQuery {
    pub name: Option<String>,
    pub email: Option<String>,
    pub limit: Option<usize>,
}

impl PatientSearchQuery {
    pub fn matches(&self, patient: &Patient) -> bool {
        let contains = |haystack: &str, needle: &Option<String>| {
            needle
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map_or(true, |n| haystack.to_lowercase().contains(&n.to_lowercase()))
        };

        contains(&patient.name, &self.name) && contains(&patient.email, &self.email)
    }
}

/// A patient's chart: the record plus visit and prescription history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientRecords {
    pub patient: Patient,
    pub age: Option<u32>,
    pub appointments: Vec<Appointment>,
    pub prescriptions: Vec<Prescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum PatientError {
    #[error("Patient not found")]
    NotFound,

    #[error("Patient with email {email} already exists")]
    EmailAlreadyExists { email: String },

    #[error("Invalid date of birth")]
    InvalidDateOfBirth,

    #[error("Unauthorized access to patient data")]
    Unauthorized,

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::NotFound => AppError::NotFound(err.to_string()),
            PatientError::EmailAlreadyExists { .. } => AppError::Conflict(err.to_string()),
            PatientError::Unauthorized => AppError::Forbidden(err.to_string()),
            PatientError::InvalidDateOfBirth | PatientError::ValidationError(_) => {
                AppError::ValidationError(err.to_string())
            }
        }
    }
}
