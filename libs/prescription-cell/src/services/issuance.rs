// libs/prescription-cell/src/services/issuance.rs
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use appointment_cell::{AppointmentError, AppointmentLifecycleService, LifecycleAction};
use shared_database::{AppState, ClinicalData, ClinicalStore};
use shared_models::auth::Actor;
use shared_models::clinical::{ClinicalId, Medicine, MedicineLine, NewPrescription, Prescription};

use crate::models::{IssuePrescriptionRequest, IssuedPrescription, MedicineLineRequest, PrescriptionError};

pub struct PrescriptionService {
    store: Arc<ClinicalStore>,
    lifecycle: AppointmentLifecycleService,
}

impl PrescriptionService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            lifecycle: AppointmentLifecycleService::new(state.config.lifecycle_policy),
        }
    }

    /// Write a prescription for a confirmed visit and complete the visit.
    ///
    /// Every check runs before the first mutation, inside one store write, so the
    /// prescription and the completed appointment appear together or not at all.
    #[instrument(skip(self, request), fields(appointment_id = request.appointment_id))]
    pub fn issue(
        &self,
        actor: &Actor,
        request: IssuePrescriptionRequest,
    ) -> Result<IssuedPrescription, PrescriptionError> {
        let selected = selected_lines(request.medicines)?;
        let appointment_id = request.appointment_id;

        self.store.write(|data| -> Result<IssuedPrescription, PrescriptionError> {
            let appointment = data
                .appointment(appointment_id)
                .cloned()
                .ok_or(AppointmentError::NotFound)?;

            self.lifecycle.authorize(actor, LifecycleAction::Complete, &appointment)?;

            if data.prescription_for_appointment(appointment_id).is_some() {
                warn!("Appointment {} already has a prescription", appointment_id);
                return Err(PrescriptionError::AlreadyPrescribed(appointment_id));
            }

            self.lifecycle
                .validate_status_transition(&appointment.status, LifecycleAction::Complete)?;

            let medicines = resolve_lines(data, selected)?;

            let appointment = self.lifecycle.apply(
                data,
                actor,
                appointment_id,
                LifecycleAction::Complete,
                Default::default(),
            )?;
            let prescription = data.insert_prescription(NewPrescription {
                patient_id: appointment.patient_id,
                doctor_id: appointment.doctor_id,
                appointment_id,
                medicines,
                notes: request.notes.filter(|n| !n.trim().is_empty()),
            });

            info!(
                "Issued prescription {} for appointment {} ({} lines)",
                prescription.id,
                appointment_id,
                prescription.medicines.len()
            );
            Ok(IssuedPrescription { prescription, appointment })
        })
    }

    pub fn get_prescription(&self, actor: &Actor, id: ClinicalId) -> Result<Prescription, PrescriptionError> {
        let prescription = self.store.get_prescription(id).ok_or(PrescriptionError::NotFound)?;
        if !actor.may_view_patient(prescription.patient_id) {
            return Err(PrescriptionError::Unauthorized(
                "Not authorized to view this prescription".to_string(),
            ));
        }
        Ok(prescription)
    }

    pub fn patient_prescriptions(
        &self,
        actor: &Actor,
        patient_id: ClinicalId,
    ) -> Result<Vec<Prescription>, PrescriptionError> {
        if !actor.may_view_patient(patient_id) {
            return Err(PrescriptionError::Unauthorized(
                "Not authorized to view this patient's prescriptions".to_string(),
            ));
        }
        Ok(self.store.prescriptions_by_patient(patient_id))
    }

    pub fn list_medicines(&self) -> Vec<Medicine> {
        self.store.medicines()
    }

    pub fn get_medicine(&self, id: ClinicalId) -> Result<Medicine, PrescriptionError> {
        self.store.get_medicine(id).ok_or(PrescriptionError::MedicineNotFound(id))
    }
}

/// Drop lines with no medicine selected and check the rest are filled in.
fn selected_lines(
    lines: Vec<MedicineLineRequest>,
) -> Result<Vec<(ClinicalId, MedicineLineRequest)>, PrescriptionError> {
    let mut selected = Vec::with_capacity(lines.len());

    for line in lines {
        let Some(medicine_id) = line.medicine_id() else {
            debug!("Skipping medicine line with no selection");
            continue;
        };
        let medicine_id = medicine_id?;

        if line.dosage.trim().is_empty() || line.frequency.trim().is_empty() {
            return Err(PrescriptionError::ValidationError(format!(
                "Dosage and frequency are required for medicine {}",
                medicine_id
            )));
        }
        selected.push((medicine_id, line));
    }

    if selected.is_empty() {
        return Err(PrescriptionError::ValidationError(
            "At least one medicine is required".to_string(),
        ));
    }
    Ok(selected)
}

fn resolve_lines(
    data: &ClinicalData,
    selected: Vec<(ClinicalId, MedicineLineRequest)>,
) -> Result<Vec<MedicineLine>, PrescriptionError> {
    selected
        .into_iter()
        .map(|(medicine_id, line)| {
            let medicine = data
                .medicine(medicine_id)
                .ok_or(PrescriptionError::MedicineNotFound(medicine_id))?;
            Ok(MedicineLine {
                medicine_id,
                medicine_name: medicine.name.clone(),
                dosage: line.dosage.trim().to_string(),
                frequency: line.frequency.trim().to_string(),
                duration: line.duration.trim().to_string(),
                instructions: line.instructions.trim().to_string(),
            })
        })
        .collect()
}
