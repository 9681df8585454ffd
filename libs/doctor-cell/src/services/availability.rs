use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use shared_database::{AppState, ClinicalData, ClinicalStore};
use shared_models::clinical::{ClinicalId, Doctor};

use crate::models::{AvailabilityQuery, AvailableDoctor, DoctorError, DoctorSearchFilters, SlotAvailability, SlotBoard};

/// Slot boards: the doctor's catalog laid against the bookings on a date.
pub struct AvailabilityService {
    store: Arc<ClinicalStore>,
}

impl AvailabilityService {
    pub fn new(state: &AppState) -> Self {
        Self { store: state.store.clone() }
    }

    pub fn slot_board(&self, doctor_id: ClinicalId, date: NaiveDate) -> Result<SlotBoard, DoctorError> {
        self.store.read(|data| -> Result<SlotBoard, DoctorError> {
            let doctor = data.doctor(doctor_id).ok_or(DoctorError::NotFound)?;
            Ok(board_for(data, doctor, date))
        })
    }

    /// Doctors with at least one untaken slot on the date, optionally by specialty.
    pub fn available_doctors(&self, query: &AvailabilityQuery) -> Result<Vec<AvailableDoctor>, DoctorError> {
        let filters = DoctorSearchFilters {
            specialization: query.specialization.clone(),
            name: None,
        };

        let available: Vec<AvailableDoctor> = self.store.read(|data| {
            data.doctors
                .iter()
                .filter(|d| filters.matches(d))
                .filter_map(|doctor| {
                    let free_slots = board_for(data, doctor, query.date).free_slots();
                    (!free_slots.is_empty()).then(|| AvailableDoctor {
                        doctor: doctor.clone(),
                        free_slots,
                    })
                })
                .collect()
        });

        if available.is_empty() && query.specialization.is_some() {
            return Err(DoctorError::NotAvailable(query.date));
        }
        debug!("{} doctors available on {}", available.len(), query.date);
        Ok(available)
    }
}

fn board_for(data: &ClinicalData, doctor: &Doctor, date: NaiveDate) -> SlotBoard {
    let booked: Vec<_> = data
        .appointments
        .iter()
        .filter(|a| a.occupies(doctor.id, date, a.time))
        .map(|a| a.time)
        .collect();

    let slots = doctor
        .available_slots
        .iter()
        .map(|time| SlotAvailability {
            time: *time,
            booked: booked.contains(time),
        })
        .collect();

    SlotBoard {
        doctor_id: doctor.id,
        doctor_name: doctor.name.clone(),
        date,
        slots,
        off_catalog_bookings: booked.iter().filter(|t| !doctor.offers_slot(t)).count(),
    }
}
