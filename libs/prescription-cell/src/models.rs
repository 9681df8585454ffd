// libs/prescription-cell/src/models.rs
use serde::{Deserialize, Serialize};

use appointment_cell::AppointmentError;
use shared_models::clinical::{Appointment, ClinicalId, Prescription};
use shared_models::error::AppError;

pub use shared_models::clinical::{Medicine, MedicineLine};

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

/// A medicine picked on a prescription form: a numeric id, or the raw text of a select box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MedicineSelection {
    Id(ClinicalId),
    Text(String),
}

impl MedicineSelection {
    /// `None` when nothing was selected.
    pub fn selected(&self) -> Option<Result<ClinicalId, PrescriptionError>> {
        match self {
            MedicineSelection::Id(id) => Some(Ok(*id)),
            MedicineSelection::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return None;
                }
                Some(text.parse().map_err(|_| {
                    PrescriptionError::ValidationError(format!("Invalid medicine id: {}", text))
                }))
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MedicineLineRequest {
    #[serde(default)]
    pub medicine_id: Option<MedicineSelection>,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub instructions: String,
}

impl MedicineLineRequest {
    pub fn medicine_id(&self) -> Option<Result<ClinicalId, PrescriptionError>> {
        self.medicine_id.as_ref().and_then(MedicineSelection::selected)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuePrescriptionRequest {
    pub appointment_id: ClinicalId,
    pub medicines: Vec<MedicineLineRequest>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// The prescription together with the appointment it completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedPrescription {
    pub prescription: Prescription,
    pub appointment: Appointment,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PrescriptionError {
    #[error("Prescription not found")]
    NotFound,

    #[error("Medicine {0} not found")]
    MedicineNotFound(ClinicalId),

    #[error("Appointment {0} already has a prescription")]
    AlreadyPrescribed(ClinicalId),

    #[error(transparent)]
    Lifecycle(#[from] AppointmentError),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<PrescriptionError> for AppError {
    fn from(err: PrescriptionError) -> Self {
        match err {
            PrescriptionError::NotFound | PrescriptionError::MedicineNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            PrescriptionError::AlreadyPrescribed(_) => AppError::Conflict(err.to_string()),
            PrescriptionError::Lifecycle(inner) => inner.into(),
            PrescriptionError::Unauthorized(msg) => AppError::Forbidden(msg),
            PrescriptionError::ValidationError(_) => AppError::ValidationError(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    #[test]
    fn selection_accepts_numbers_and_select_box_text() {
        let lines: Vec<MedicineLineRequest> = serde_json::from_value(json!([
            { "medicine_id": "" },
            { "medicine_id": "2", "dosage": "500mg" },
            { "medicine_id": 3 },
            { "dosage": "10mg" },
        ]))
        .unwrap();

        assert_eq!(lines[0].medicine_id(), None);
        assert_eq!(lines[1].medicine_id(), Some(Ok(2)));
        assert_eq!(lines[2].medicine_id(), Some(Ok(3)));
        assert_eq!(lines[3].medicine_id(), None);
    }

    #[test]
    fn garbage_selection_is_a_validation_error() {
        let selection = MedicineSelection::Text("aspirin".to_string());
        assert_matches!(selection.selected(), Some(Err(PrescriptionError::ValidationError(_))));
    }

    #[test]
    fn lifecycle_errors_keep_their_status() {
        let err: AppError = PrescriptionError::Lifecycle(AppointmentError::NotFound).into();
        assert_matches!(err, AppError::NotFound(_));

        let err: AppError = PrescriptionError::AlreadyPrescribed(4).into();
        assert_matches!(err, AppError::Conflict(_));
    }
}
