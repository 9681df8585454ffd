use std::sync::Arc;

use tracing::debug;

use shared_database::{AppState, ClinicalStore};
use shared_models::clinical::ClinicalId;

use crate::models::{Doctor, DoctorError, DoctorSearchFilters};

/// Read access to the doctor catalog.
pub struct DoctorService {
    store: Arc<ClinicalStore>,
}

impl DoctorService {
    pub fn new(state: &AppState) -> Self {
        Self { store: state.store.clone() }
    }

    pub fn search_doctors(&self, filters: &DoctorSearchFilters) -> Vec<Doctor> {
        debug!("Searching doctors with filters: {:?}", filters);
        self.store.read(|data| {
            data.doctors.iter().filter(|d| filters.matches(d)).cloned().collect()
        })
    }

    pub fn get_doctor(&self, doctor_id: ClinicalId) -> Result<Doctor, DoctorError> {
        self.store.get_doctor(doctor_id).ok_or(DoctorError::NotFound)
    }
}
