// libs/appointment-cell/src/services/dashboard.rs
use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use shared_database::{AppState, ClinicalData, ClinicalStore};
use shared_models::auth::{Actor, Role};
use shared_models::clinical::{Appointment, AppointmentStatus, ClinicalId};

use crate::models::{
    AppointmentError, AppointmentSummary, Dashboard, DoctorDashboard, PatientDashboard,
    ReceptionistDashboard,
};
use crate::services::lifecycle::AppointmentLifecycleService;

/// Per-role overview built from the store in one read.
pub struct DashboardService {
    store: Arc<ClinicalStore>,
    lifecycle: AppointmentLifecycleService,
}

impl DashboardService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            lifecycle: AppointmentLifecycleService::new(state.config.lifecycle_policy),
        }
    }

    pub fn build(&self, actor: &Actor, today: NaiveDate) -> Result<Dashboard, AppointmentError> {
        debug!("Building {} dashboard for {}", actor.role, today);

        let missing_profile =
            || AppointmentError::Unauthorized(format!("{} account has no linked profile", actor.role));

        self.store.read(|data| -> Result<Dashboard, AppointmentError> {
            match actor.role {
                Role::Patient => {
                    let patient_id = actor.profile_id.ok_or_else(missing_profile)?;
                    Ok(Dashboard::Patient(self.patient_view(data, patient_id)))
                }
                Role::Doctor => {
                    let doctor_id = actor.profile_id.ok_or_else(missing_profile)?;
                    Ok(Dashboard::Doctor(self.doctor_view(data, doctor_id, today)))
                }
                Role::Receptionist => Ok(Dashboard::Receptionist(self.receptionist_view(data, today))),
            }
        })
    }

    fn summaries<'a>(
        &self,
        data: &ClinicalData,
        appointments: impl Iterator<Item = &'a Appointment>,
    ) -> Vec<AppointmentSummary> {
        appointments
            .map(|a| AppointmentSummary {
                appointment: a.clone(),
                patient_name: data.patient(a.patient_id).map(|p| p.name.clone()),
                doctor_name: data.doctor(a.doctor_id).map(|d| d.name.clone()),
                available_actions: self.lifecycle.available_actions(&a.status),
            })
            .collect()
    }

    fn patient_view(&self, data: &ClinicalData, patient_id: ClinicalId) -> PatientDashboard {
        let own = || data.appointments.iter().filter(move |a| a.patient_id == patient_id);

        PatientDashboard {
            patient_id,
            upcoming: self.summaries(data, own().filter(|a| a.status.is_upcoming())),
            history: self.summaries(data, own().filter(|a| a.status.is_terminal())),
            prescriptions: data.prescriptions_by_patient(patient_id),
        }
    }

    fn doctor_view(&self, data: &ClinicalData, doctor_id: ClinicalId, today: NaiveDate) -> DoctorDashboard {
        let own = || data.appointments.iter().filter(move |a| a.doctor_id == doctor_id);

        DoctorDashboard {
            doctor_id,
            today: self.summaries(data, own().filter(|a| a.date == today)),
            pending: self.summaries(data, own().filter(|a| a.status == AppointmentStatus::Scheduled)),
            confirmed: self.summaries(data, own().filter(|a| a.status == AppointmentStatus::Confirmed)),
            completed_count: own().filter(|a| a.status == AppointmentStatus::Completed).count(),
        }
    }

    fn receptionist_view(&self, data: &ClinicalData, today: NaiveDate) -> ReceptionistDashboard {
        let mut by_status: BTreeMap<AppointmentStatus, usize> =
            AppointmentStatus::ALL.into_iter().map(|s| (s, 0)).collect();
        for appointment in &data.appointments {
            *by_status.entry(appointment.status).or_default() += 1;
        }

        ReceptionistDashboard {
            today: self.summaries(data, data.appointments.iter().filter(|a| a.date == today)),
            total_patients: data.patients.len(),
            total_appointments: data.appointments.len(),
            by_status,
        }
    }
}
