use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use shared_models::clinical::{ClinicalId, SlotTime};
use shared_models::error::AppError;

pub use shared_models::clinical::Doctor;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoctorSearchFilters {
    pub specialization: Option<String>,
    pub name: Option<String>,
}

impl DoctorSearchFilters {
    pub fn matches(&self, doctor: &Doctor) -> bool {
        let contains = |haystack: &str, needle: &Option<String>| {
            needle
                .as_deref()
                .map_or(true, |n| haystack.to_lowercase().contains(&n.trim().to_lowercase()))
        };
        contains(&doctor.specialization, &self.specialization) && contains(&doctor.name, &self.name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
    pub specialization: Option<String>,
}

/// One catalog slot on a given date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotAvailability {
    pub time: SlotTime,
    pub booked: bool,
}

/// A doctor's slot catalog for one date, with taken slots flagged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotBoard {
    pub doctor_id: ClinicalId,
    pub doctor_name: String,
    pub date: NaiveDate,
    pub slots: Vec<SlotAvailability>,
    /// Bookings on this date at times outside the catalog.
    pub off_catalog_bookings: usize,
}

impl SlotBoard {
    pub fn free_slots(&self) -> Vec<SlotTime> {
        self.slots.iter().filter(|s| !s.booked).map(|s| s.time).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableDoctor {
    pub doctor: Doctor,
    pub free_slots: Vec<SlotTime>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("No doctors with the required specialty are available on {0}")]
    NotAvailable(NaiveDate),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound | DoctorError::NotAvailable(_) => AppError::NotFound(err.to_string()),
            DoctorError::ValidationError(_) => AppError::ValidationError(err.to_string()),
        }
    }
}
