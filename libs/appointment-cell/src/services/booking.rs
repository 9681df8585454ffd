// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use tracing::{debug, info, instrument};

use shared_config::LifecyclePolicy;
use shared_database::{AppState, ClinicalData, ClinicalStore};
use shared_models::auth::{Actor, Role};
use shared_models::clinical::{Appointment, ClinicalId, NewAppointment};

use crate::models::{
    AppointmentError, AppointmentQueryParams, AppointmentSummary, BookAppointmentRequest,
    ConflictCheckQuery, ConflictCheckResponse, LifecycleAction, UpdateAppointmentRequest,
};
use crate::services::conflict::ConflictDetectionService;
use crate::services::lifecycle::AppointmentLifecycleService;

pub struct AppointmentBookingService {
    store: Arc<ClinicalStore>,
    lifecycle: AppointmentLifecycleService,
    conflicts: ConflictDetectionService,
}

impl AppointmentBookingService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            lifecycle: AppointmentLifecycleService::new(state.config.lifecycle_policy),
            conflicts: ConflictDetectionService::new(&state.config),
        }
    }

    // ==========================================================================
    // MUTATIONS
    // ==========================================================================

    /// Book a new appointment. Patients book for themselves, the front desk for anyone.
    #[instrument(skip(self, request), fields(role = %actor.role))]
    pub fn book_appointment(
        &self,
        actor: &Actor,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let patient_id = match (actor.role, request.patient_id) {
            (Role::Patient, requested) => {
                let own = actor.profile_id.ok_or_else(|| {
                    AppointmentError::Unauthorized("Patient account has no patient record".to_string())
                })?;
                if requested.is_some_and(|id| id != own) {
                    return Err(AppointmentError::Unauthorized(
                        "Patients can only book their own appointments".to_string(),
                    ));
                }
                own
            }
            (Role::Receptionist, Some(id)) => id,
            (Role::Receptionist, None) => {
                return Err(AppointmentError::ValidationError("patient_id is required".to_string()));
            }
            (Role::Doctor, _) => {
                return Err(AppointmentError::Unauthorized(
                    "Doctors cannot book appointments".to_string(),
                ));
            }
        };

        self.store.write(|data| {
            if data.patient(patient_id).is_none() {
                return Err(AppointmentError::PatientNotFound);
            }
            self.conflicts
                .ensure_bookable(data, request.doctor_id, request.date, request.time, None)?;

            let appointment = data.insert_appointment(NewAppointment {
                patient_id,
                doctor_id: request.doctor_id,
                date: request.date,
                time: request.time,
                reason: request.reason,
            });

            info!(
                "Booked appointment {} for patient {} with doctor {} on {} at {}",
                appointment.id, patient_id, appointment.doctor_id, appointment.date, appointment.time
            );
            Ok(appointment)
        })
    }

    pub fn confirm_appointment(&self, actor: &Actor, id: ClinicalId) -> Result<Appointment, AppointmentError> {
        self.transition(actor, id, LifecycleAction::Confirm)
    }

    pub fn cancel_appointment(&self, actor: &Actor, id: ClinicalId) -> Result<Appointment, AppointmentError> {
        self.transition(actor, id, LifecycleAction::Cancel)
    }

    fn transition(
        &self,
        actor: &Actor,
        id: ClinicalId,
        action: LifecycleAction,
    ) -> Result<Appointment, AppointmentError> {
        self.store
            .write(|data| self.lifecycle.apply(data, actor, id, action, Default::default()))
    }

    /// Front-desk edit of booking details.
    ///
    /// Guarded: a reschedule that returns the appointment to `scheduled`; status cannot be set.
    /// Permissive: the fields, status included, are merged as given.
    #[instrument(skip(self, request), fields(role = %actor.role))]
    pub fn update_appointment(
        &self,
        actor: &Actor,
        id: ClinicalId,
        request: UpdateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        if request.is_empty() {
            return Err(AppointmentError::ValidationError("No fields to update".to_string()));
        }

        let guarded = self.lifecycle.policy() == LifecyclePolicy::Guarded;
        if guarded && request.status.is_some() {
            return Err(AppointmentError::ValidationError(
                "Status changes go through confirm, cancel, or prescription issuance".to_string(),
            ));
        }

        self.store.write(|data| -> Result<Appointment, AppointmentError> {
            let current = data.appointment(id).cloned().ok_or(AppointmentError::NotFound)?;
            self.lifecycle.authorize(actor, LifecycleAction::Reschedule, &current)?;
            self.check_references(data, &request)?;

            if request.moves_slot() {
                let doctor_id = request.doctor_id.unwrap_or(current.doctor_id);
                let date = request.date.unwrap_or(current.date);
                let time = request.time.unwrap_or(current.time);
                self.conflicts.ensure_bookable(data, doctor_id, date, time, Some(id))?;
            }

            if guarded {
                return self.lifecycle.apply(data, actor, id, LifecycleAction::Reschedule, request.into_patch());
            }

            debug!("Merging unguarded edit into appointment {}", id);
            data.patch_appointment(id, request.into_patch()).ok_or(AppointmentError::NotFound)
        })
    }

    fn check_references(
        &self,
        data: &ClinicalData,
        request: &UpdateAppointmentRequest,
    ) -> Result<(), AppointmentError> {
        if request.patient_id.is_some_and(|id| data.patient(id).is_none()) {
            return Err(AppointmentError::PatientNotFound);
        }
        if request.doctor_id.is_some_and(|id| data.doctor(id).is_none()) {
            return Err(AppointmentError::DoctorNotFound);
        }
        Ok(())
    }

    // ==========================================================================
    // QUERIES
    // ==========================================================================

    pub fn get_appointment(&self, actor: &Actor, id: ClinicalId) -> Result<AppointmentSummary, AppointmentError> {
        self.store.read(|data| -> Result<AppointmentSummary, AppointmentError> {
            let appointment = data.appointment(id).ok_or(AppointmentError::NotFound)?;
            let visible = actor.role == Role::Receptionist
                || actor.is_patient(appointment.patient_id)
                || actor.is_doctor(appointment.doctor_id);
            if !visible {
                return Err(AppointmentError::Unauthorized(
                    "Not authorized to view this appointment".to_string(),
                ));
            }
            Ok(self.summarize(data, appointment))
        })
    }

    pub fn list_appointments(
        &self,
        actor: &Actor,
        params: &AppointmentQueryParams,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        if actor.role != Role::Receptionist {
            return Err(AppointmentError::Unauthorized(
                "Only the front desk can list every appointment".to_string(),
            ));
        }
        Ok(self.store.read(|data| {
            data.appointments.iter().filter(|a| params.matches(a)).cloned().collect()
        }))
    }

    pub fn patient_appointments(
        &self,
        actor: &Actor,
        patient_id: ClinicalId,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        if !actor.may_view_patient(patient_id) {
            return Err(AppointmentError::Unauthorized(
                "Not authorized to view this patient's appointments".to_string(),
            ));
        }
        Ok(self.store.appointments_by_patient(patient_id))
    }

    pub fn doctor_appointments(
        &self,
        actor: &Actor,
        doctor_id: ClinicalId,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        if !actor.may_view_doctor_schedule(doctor_id) {
            return Err(AppointmentError::Unauthorized(
                "Not authorized to view this doctor's schedule".to_string(),
            ));
        }
        Ok(self.store.appointments_by_doctor(doctor_id))
    }

    pub fn check_conflicts(&self, query: &ConflictCheckQuery) -> Result<ConflictCheckResponse, AppointmentError> {
        self.store.read(|data| self.conflicts.check_conflicts(data, query))
    }

    pub fn summarize(&self, data: &ClinicalData, appointment: &Appointment) -> AppointmentSummary {
        AppointmentSummary {
            appointment: appointment.clone(),
            patient_name: data.patient(appointment.patient_id).map(|p| p.name.clone()),
            doctor_name: data.doctor(appointment.doctor_id).map(|d| d.name.clone()),
            available_actions: self.lifecycle.available_actions(&appointment.status),
        }
    }
}
