// libs/appointment-cell/src/services/lifecycle.rs
use tracing::{debug, info, warn};

use shared_config::LifecyclePolicy;
use shared_database::ClinicalData;
use shared_models::auth::{Actor, Role};
use shared_models::clinical::{Appointment, AppointmentPatch, AppointmentStatus, ClinicalId};

use crate::models::{AppointmentError, LifecycleAction};

/// State machine for appointment status plus the role matrix for who may drive it.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppointmentLifecycleService {
    policy: LifecyclePolicy,
}

impl AppointmentLifecycleService {
    pub fn new(policy: LifecyclePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> LifecyclePolicy {
        self.policy
    }

    /// Get all valid next statuses for a given current status
    pub fn get_valid_transitions(&self, current_status: &AppointmentStatus) -> Vec<AppointmentStatus> {
        match current_status {
            AppointmentStatus::Scheduled => vec![
                AppointmentStatus::Confirmed,
                AppointmentStatus::Cancelled,
            ],
            AppointmentStatus::Confirmed => vec![
                AppointmentStatus::Completed,
                AppointmentStatus::Cancelled,
            ],
            // Terminal states - no transitions allowed
            AppointmentStatus::Completed => vec![],
            AppointmentStatus::Cancelled => vec![],
        }
    }

    /// Actions the lifecycle graph allows from `current_status`, ignoring who is asking.
    pub fn available_actions(&self, current_status: &AppointmentStatus) -> Vec<LifecycleAction> {
        [
            LifecycleAction::Confirm,
            LifecycleAction::Cancel,
            LifecycleAction::Complete,
            LifecycleAction::Reschedule,
        ]
        .into_iter()
        .filter(|action| self.is_permitted_from(current_status, *action))
        .collect()
    }

    fn is_permitted_from(&self, current_status: &AppointmentStatus, action: LifecycleAction) -> bool {
        match action {
            LifecycleAction::Reschedule => current_status.is_upcoming(),
            _ => self.get_valid_transitions(current_status).contains(&action.target_status()),
        }
    }

    /// Validate that `action` may be applied to an appointment in `current_status`.
    pub fn validate_status_transition(
        &self,
        current_status: &AppointmentStatus,
        action: LifecycleAction,
    ) -> Result<(), AppointmentError> {
        debug!("Validating {} from {}", action, current_status);

        if self.policy == LifecyclePolicy::Permissive {
            return Ok(());
        }

        if !self.is_permitted_from(current_status, action) {
            warn!("Invalid status transition attempted: {} -> {}", current_status, action);
            return Err(AppointmentError::InvalidStatusTransition {
                from: *current_status,
                action,
            });
        }

        Ok(())
    }

    /// Check that `actor` may perform `action` on `appointment`.
    pub fn authorize(
        &self,
        actor: &Actor,
        action: LifecycleAction,
        appointment: &Appointment,
    ) -> Result<(), AppointmentError> {
        let owns_as_doctor = actor.is_doctor(appointment.doctor_id);
        let allowed = match action {
            LifecycleAction::Confirm => owns_as_doctor || actor.role == Role::Receptionist,
            LifecycleAction::Cancel => {
                owns_as_doctor
                    || actor.is_patient(appointment.patient_id)
                    || actor.role == Role::Receptionist
            }
            LifecycleAction::Complete => owns_as_doctor,
            LifecycleAction::Reschedule => actor.role == Role::Receptionist,
        };

        if !allowed {
            warn!("{} may not {} appointment {}", actor.role, action, appointment.id);
            return Err(AppointmentError::Unauthorized(format!(
                "A {} cannot {} this appointment",
                actor.role, action
            )));
        }

        Ok(())
    }

    /// Apply `action` to appointment `id` inside an already held store write.
    ///
    /// `changes` carries the booking fields of a reschedule and is ignored for other actions.
    pub fn apply(
        &self,
        data: &mut ClinicalData,
        actor: &Actor,
        id: ClinicalId,
        action: LifecycleAction,
        changes: AppointmentPatch,
    ) -> Result<Appointment, AppointmentError> {
        let current = data.appointment(id).cloned().ok_or(AppointmentError::NotFound)?;

        self.authorize(actor, action, &current)?;

        // Cancelling twice is not an error.
        if action == LifecycleAction::Cancel && current.status == AppointmentStatus::Cancelled {
            debug!("Appointment {} already cancelled", id);
            return Ok(current);
        }

        self.validate_status_transition(&current.status, action)?;

        let patch = match action {
            LifecycleAction::Reschedule => AppointmentPatch {
                status: Some(AppointmentStatus::Scheduled),
                ..changes
            },
            _ => AppointmentPatch::status(action.target_status()),
        };

        let updated = data.patch_appointment(id, patch).ok_or(AppointmentError::NotFound)?;
        info!(
            "Appointment {} {}: {} -> {}",
            id, action, current.status, updated.status
        );
        Ok(updated)
    }
}
