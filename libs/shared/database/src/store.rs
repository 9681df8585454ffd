use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_models::clinical::{
    Appointment, AppointmentPatch, AppointmentStatus, ClinicalId, Doctor, Medicine, NewAppointment,
    NewPatient, NewPrescription, Patient, Prescription,
};

use crate::{seed, snapshot};

/// The five clinical collections plus the id counter.
///
/// All reads and writes go through [`ClinicalStore`]; the collections keep insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClinicalData {
    pub doctors: Vec<Doctor>,
    pub patients: Vec<Patient>,
    pub appointments: Vec<Appointment>,
    pub medicines: Vec<Medicine>,
    pub prescriptions: Vec<Prescription>,
    #[serde(default)]
    last_id: ClinicalId,
    #[serde(skip)]
    revision: u64,
}

impl ClinicalData {
    pub fn new(doctors: Vec<Doctor>, medicines: Vec<Medicine>) -> Self {
        let mut data = Self {
            doctors,
            medicines,
            ..Self::default()
        };
        data.last_id = data.highest_id();
        data
    }

    /// Timestamp-derived id, strictly greater than every id handed out before.
    pub fn next_id(&mut self) -> ClinicalId {
        let now = Utc::now().timestamp_millis().max(0) as ClinicalId;
        let id = now.max(self.last_id + 1);
        self.last_id = id;
        id
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn highest_id(&self) -> ClinicalId {
        let ids = self.doctors.iter().map(|d| d.id)
            .chain(self.patients.iter().map(|p| p.id))
            .chain(self.appointments.iter().map(|a| a.id))
            .chain(self.medicines.iter().map(|m| m.id))
            .chain(self.prescriptions.iter().map(|p| p.id));
        ids.max().unwrap_or(0).max(self.last_id)
    }

    pub(crate) fn reconcile_counter(&mut self) {
        self.last_id = self.highest_id();
    }

    // --------------------------------------------------------------------------
    // Mutations
    // --------------------------------------------------------------------------

    pub fn insert_appointment(&mut self, data: NewAppointment) -> Appointment {
        let appointment = Appointment {
            id: self.next_id(),
            patient_id: data.patient_id,
            doctor_id: data.doctor_id,
            date: data.date,
            time: data.time,
            reason: data.reason,
            status: AppointmentStatus::Scheduled,
            created_at: Utc::now(),
        };
        self.appointments.push(appointment.clone());
        self.revision += 1;
        appointment
    }

    /// Merge `patch` into the appointment with `id`. Returns `None` when no such appointment exists.
    pub fn patch_appointment(&mut self, id: ClinicalId, patch: AppointmentPatch) -> Option<Appointment> {
        let appointment = self.appointments.iter_mut().find(|a| a.id == id)?;
        patch.apply_to(appointment);
        self.revision += 1;
        Some(appointment.clone())
    }

    pub fn insert_patient(&mut self, data: NewPatient) -> Patient {
        let patient = Patient {
            id: self.next_id(),
            name: data.name,
            email: data.email,
            phone: data.phone,
            date_of_birth: data.date_of_birth,
            gender: data.gender,
            address: data.address,
        };
        self.patients.push(patient.clone());
        self.revision += 1;
        patient
    }

    pub fn insert_prescription(&mut self, data: NewPrescription) -> Prescription {
        let prescription = Prescription {
            id: self.next_id(),
            patient_id: data.patient_id,
            doctor_id: data.doctor_id,
            appointment_id: data.appointment_id,
            medicines: data.medicines,
            notes: data.notes,
            created_at: Utc::now(),
        };
        self.prescriptions.push(prescription.clone());
        self.revision += 1;
        prescription
    }

    // --------------------------------------------------------------------------
    // Lookups
    // --------------------------------------------------------------------------

    pub fn doctor(&self, id: ClinicalId) -> Option<&Doctor> {
        self.doctors.iter().find(|d| d.id == id)
    }

    pub fn patient(&self, id: ClinicalId) -> Option<&Patient> {
        self.patients.iter().find(|p| p.id == id)
    }

    pub fn appointment(&self, id: ClinicalId) -> Option<&Appointment> {
        self.appointments.iter().find(|a| a.id == id)
    }

    pub fn medicine(&self, id: ClinicalId) -> Option<&Medicine> {
        self.medicines.iter().find(|m| m.id == id)
    }

    pub fn prescription(&self, id: ClinicalId) -> Option<&Prescription> {
        self.prescriptions.iter().find(|p| p.id == id)
    }

    pub fn prescription_for_appointment(&self, appointment_id: ClinicalId) -> Option<&Prescription> {
        self.prescriptions.iter().find(|p| p.appointment_id == appointment_id)
    }

    pub fn appointments_by_patient(&self, patient_id: ClinicalId) -> Vec<Appointment> {
        self.appointments.iter().filter(|a| a.patient_id == patient_id).cloned().collect()
    }

    pub fn appointments_by_doctor(&self, doctor_id: ClinicalId) -> Vec<Appointment> {
        self.appointments.iter().filter(|a| a.doctor_id == doctor_id).cloned().collect()
    }

    pub fn prescriptions_by_patient(&self, patient_id: ClinicalId) -> Vec<Prescription> {
        self.prescriptions.iter().filter(|p| p.patient_id == patient_id).cloned().collect()
    }
}

/// Process-wide owner of the clinical collections.
///
/// Every mutation runs under one write lock, so a check followed by an update inside a
/// single [`ClinicalStore::write`] call is never interleaved with another writer.
#[derive(Debug)]
pub struct ClinicalStore {
    data: RwLock<ClinicalData>,
    snapshot_path: Option<PathBuf>,
}

impl Default for ClinicalStore {
    fn default() -> Self {
        Self::seeded()
    }
}

impl ClinicalStore {
    pub fn new(data: ClinicalData) -> Self {
        Self {
            data: RwLock::new(data),
            snapshot_path: None,
        }
    }

    /// In-memory store holding the demo catalog.
    pub fn seeded() -> Self {
        Self::new(seed::demo_data())
    }

    /// Build the store described by `config`, reloading the snapshot when one is configured.
    pub fn open(config: &AppConfig) -> Result<Self> {
        match &config.snapshot_path {
            Some(path) => Self::with_snapshot(path),
            None => Ok(Self::seeded()),
        }
    }

    /// Reload from `path` if it exists, otherwise start from the demo catalog.
    /// Every later mutation rewrites the snapshot.
    pub fn with_snapshot(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = match snapshot::load_snapshot(&path)? {
            Some(data) => {
                info!(
                    "Reloaded clinical snapshot from {} ({} patients, {} appointments)",
                    path.display(),
                    data.patients.len(),
                    data.appointments.len()
                );
                data
            }
            None => {
                info!("No snapshot at {}, starting from demo catalog", path.display());
                seed::demo_data()
            }
        };

        Ok(Self {
            data: RwLock::new(data),
            snapshot_path: Some(path),
        })
    }

    pub fn read<R>(&self, f: impl FnOnce(&ClinicalData) -> R) -> R {
        let guard = self.data.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Run `f` with exclusive access. The snapshot is rewritten when `f` changed anything.
    pub fn write<R>(&self, f: impl FnOnce(&mut ClinicalData) -> R) -> R {
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        let before = guard.revision;
        let result = f(&mut guard);
        if guard.revision != before {
            self.persist(&guard);
        }
        result
    }

    fn persist(&self, data: &ClinicalData) {
        let Some(path) = &self.snapshot_path else {
            return;
        };
        match snapshot::write_snapshot(path, data) {
            Ok(()) => debug!("Snapshot written to {}", path.display()),
            Err(e) => warn!("Failed to write snapshot to {}: {:#}", path.display(), e),
        }
    }

    // ==========================================================================
    // APPOINTMENTS
    // ==========================================================================

    /// New appointment, always `scheduled`. No slot or conflict checks.
    pub fn add_appointment(&self, data: NewAppointment) -> Appointment {
        self.write(|d| d.insert_appointment(data))
    }

    /// Merge `patch` into the appointment. Unknown ids are ignored.
    pub fn update_appointment(&self, id: ClinicalId, patch: AppointmentPatch) -> Option<Appointment> {
        let updated = self.write(|d| d.patch_appointment(id, patch));
        if updated.is_none() {
            debug!("update_appointment: no appointment with id {}", id);
        }
        updated
    }

    pub fn cancel_appointment(&self, id: ClinicalId) -> Option<Appointment> {
        self.update_appointment(id, AppointmentPatch::status(AppointmentStatus::Cancelled))
    }

    pub fn confirm_appointment(&self, id: ClinicalId) -> Option<Appointment> {
        self.update_appointment(id, AppointmentPatch::status(AppointmentStatus::Confirmed))
    }

    pub fn complete_appointment(&self, id: ClinicalId) -> Option<Appointment> {
        self.update_appointment(id, AppointmentPatch::status(AppointmentStatus::Completed))
    }

    // ==========================================================================
    // PATIENTS AND PRESCRIPTIONS
    // ==========================================================================

    pub fn add_patient(&self, data: NewPatient) -> Patient {
        self.write(|d| d.insert_patient(data))
    }

    /// Store a prescription. The linked appointment is left untouched.
    pub fn add_prescription(&self, data: NewPrescription) -> Prescription {
        self.write(|d| d.insert_prescription(data))
    }

    // ==========================================================================
    // QUERIES
    // ==========================================================================

    pub fn get_doctor(&self, id: ClinicalId) -> Option<Doctor> {
        self.read(|d| d.doctor(id).cloned())
    }

    pub fn get_patient(&self, id: ClinicalId) -> Option<Patient> {
        self.read(|d| d.patient(id).cloned())
    }

    pub fn get_appointment(&self, id: ClinicalId) -> Option<Appointment> {
        self.read(|d| d.appointment(id).cloned())
    }

    pub fn get_medicine(&self, id: ClinicalId) -> Option<Medicine> {
        self.read(|d| d.medicine(id).cloned())
    }

    pub fn get_prescription(&self, id: ClinicalId) -> Option<Prescription> {
        self.read(|d| d.prescription(id).cloned())
    }

    pub fn prescription_for_appointment(&self, appointment_id: ClinicalId) -> Option<Prescription> {
        self.read(|d| d.prescription_for_appointment(appointment_id).cloned())
    }

    pub fn appointments_by_patient(&self, patient_id: ClinicalId) -> Vec<Appointment> {
        self.read(|d| d.appointments_by_patient(patient_id))
    }

    pub fn appointments_by_doctor(&self, doctor_id: ClinicalId) -> Vec<Appointment> {
        self.read(|d| d.appointments_by_doctor(doctor_id))
    }

    pub fn prescriptions_by_patient(&self, patient_id: ClinicalId) -> Vec<Prescription> {
        self.read(|d| d.prescriptions_by_patient(patient_id))
    }

    pub fn doctors(&self) -> Vec<Doctor> {
        self.read(|d| d.doctors.clone())
    }

    pub fn patients(&self) -> Vec<Patient> {
        self.read(|d| d.patients.clone())
    }

    pub fn appointments(&self) -> Vec<Appointment> {
        self.read(|d| d.appointments.clone())
    }

    pub fn medicines(&self) -> Vec<Medicine> {
        self.read(|d| d.medicines.clone())
    }

    pub fn prescriptions(&self) -> Vec<Prescription> {
        self.read(|d| d.prescriptions.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    use super::*;

    fn booking(patient_id: ClinicalId, doctor_id: ClinicalId) -> NewAppointment {
        NewAppointment {
            patient_id,
            doctor_id,
            date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            time: "09:00".parse().unwrap(),
            reason: "Regular checkup".to_string(),
        }
    }

    #[test]
    fn added_appointment_is_scheduled_with_fresh_id() {
        let store = ClinicalStore::seeded();
        let existing: HashSet<_> = store.appointments().iter().map(|a| a.id).collect();

        let first = store.add_appointment(booking(1, 1));
        let second = store.add_appointment(booking(1, 2));

        assert_eq!(first.status, AppointmentStatus::Scheduled);
        assert!(!existing.contains(&first.id));
        assert!(second.id > first.id);
    }

    #[test]
    fn update_unknown_appointment_is_silent_noop() {
        let store = ClinicalStore::seeded();
        let before = store.appointments();

        assert!(store.update_appointment(424242, AppointmentPatch::status(AppointmentStatus::Completed)).is_none());
        assert!(store.cancel_appointment(424242).is_none());
        assert_eq!(store.appointments(), before);
    }

    #[test]
    fn raw_confirm_is_unguarded() {
        let store = ClinicalStore::seeded();
        let apt = store.add_appointment(booking(1, 1));

        store.cancel_appointment(apt.id);
        let confirmed = store.confirm_appointment(apt.id);

        assert_matches!(confirmed, Some(a) if a.status == AppointmentStatus::Confirmed);
    }

    #[test]
    fn cancel_twice_stays_cancelled() {
        let store = ClinicalStore::seeded();
        let apt = store.add_appointment(booking(1, 1));

        let once = store.cancel_appointment(apt.id).unwrap();
        let twice = store.cancel_appointment(apt.id).unwrap();

        assert_eq!(once.status, AppointmentStatus::Cancelled);
        assert_eq!(twice.status, AppointmentStatus::Cancelled);
    }

    #[test]
    fn patient_query_keeps_insertion_order() {
        let store = ClinicalStore::seeded();
        let patient = store.add_patient(NewPatient {
            name: "Jane Roe".to_string(),
            email: "jane@example.com".to_string(),
            phone: "+1-555-0100".to_string(),
            date_of_birth: None,
            gender: None,
            address: None,
        });

        let a = store.add_appointment(booking(patient.id, 1));
        let b = store.add_appointment(booking(patient.id, 2));
        store.add_appointment(booking(1, 3));

        let ids: Vec<_> = store.appointments_by_patient(patient.id).iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
        assert!(store.appointments_by_patient(999).is_empty());
    }

    #[test]
    fn add_prescription_leaves_appointment_alone() {
        let store = ClinicalStore::seeded();
        let apt = store.add_appointment(booking(1, 1));

        let prescription = store.add_prescription(NewPrescription {
            patient_id: 1,
            doctor_id: 1,
            appointment_id: apt.id,
            medicines: vec![],
            notes: None,
        });

        assert_eq!(store.get_appointment(apt.id).unwrap().status, AppointmentStatus::Scheduled);
        assert_eq!(store.prescription_for_appointment(apt.id).unwrap().id, prescription.id);
        assert_eq!(store.prescriptions_by_patient(1).last().unwrap().id, prescription.id);
    }

    #[test]
    fn write_without_change_keeps_revision() {
        let store = ClinicalStore::seeded();
        let before = store.read(|d| d.revision());
        store.write(|d| d.appointment(1).cloned());
        assert_eq!(store.read(|d| d.revision()), before);
    }
}
