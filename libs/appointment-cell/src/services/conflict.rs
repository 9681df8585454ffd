// libs/appointment-cell/src/services/conflict.rs
use chrono::NaiveDate;
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_database::ClinicalData;
use shared_models::clinical::{Appointment, ClinicalId, SlotTime};

use crate::models::{AppointmentError, ConflictCheckQuery, ConflictCheckResponse};

/// Slot catalog and double-booking checks.
///
/// Both checks are reported by [`ConflictDetectionService::check_conflicts`]; they only
/// block a booking when switched on in the configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictDetectionService {
    enforce_slot_catalog: bool,
    reject_double_booking: bool,
}

impl ConflictDetectionService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            enforce_slot_catalog: config.enforce_slot_catalog,
            reject_double_booking: config.reject_double_booking,
        }
    }

    pub fn conflicting_appointments(
        &self,
        data: &ClinicalData,
        doctor_id: ClinicalId,
        date: NaiveDate,
        time: SlotTime,
        exclude_appointment_id: Option<ClinicalId>,
    ) -> Vec<Appointment> {
        data.appointments
            .iter()
            .filter(|a| Some(a.id) != exclude_appointment_id)
            .filter(|a| a.occupies(doctor_id, date, time))
            .cloned()
            .collect()
    }

    pub fn check_conflicts(
        &self,
        data: &ClinicalData,
        query: &ConflictCheckQuery,
    ) -> Result<ConflictCheckResponse, AppointmentError> {
        let doctor = data.doctor(query.doctor_id).ok_or(AppointmentError::DoctorNotFound)?;
        let conflicting = self.conflicting_appointments(
            data,
            query.doctor_id,
            query.date,
            query.time,
            query.exclude_appointment_id,
        );

        debug!(
            "Conflict check for doctor {} on {} at {}: {} overlapping",
            query.doctor_id, query.date, query.time, conflicting.len()
        );

        Ok(ConflictCheckResponse {
            has_conflict: !conflicting.is_empty(),
            slot_offered: doctor.offers_slot(&query.time),
            conflicting_appointments: conflicting,
        })
    }

    /// Reject the booking when an enabled check fails.
    pub fn ensure_bookable(
        &self,
        data: &ClinicalData,
        doctor_id: ClinicalId,
        date: NaiveDate,
        time: SlotTime,
        exclude_appointment_id: Option<ClinicalId>,
    ) -> Result<(), AppointmentError> {
        let doctor = data.doctor(doctor_id).ok_or(AppointmentError::DoctorNotFound)?;

        if self.enforce_slot_catalog && !doctor.offers_slot(&time) {
            warn!("Doctor {} does not offer slot {}", doctor_id, time);
            return Err(AppointmentError::SlotNotOffered { doctor_id, time });
        }

        if self.reject_double_booking
            && !self.conflicting_appointments(data, doctor_id, date, time, exclude_appointment_id).is_empty()
        {
            warn!("Doctor {} already booked on {} at {}", doctor_id, date, time);
            return Err(AppointmentError::ConflictDetected);
        }

        Ok(())
    }
}
