use std::sync::{Arc, OnceLock};

use chrono::{NaiveDate, Utc};
use regex::Regex;
use tracing::{debug, info, warn};

use shared_database::{AppState, ClinicalStore};
use shared_models::auth::{Actor, Role};
use shared_models::clinical::ClinicalId;

use crate::models::{CreatePatientRequest, Patient, PatientError, PatientRecords, PatientSearchQuery};

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

fn email_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(EMAIL_PATTERN).ok()).as_ref()
}

pub fn is_valid_email(email: &str) -> bool {
    match email_pattern() {
        Some(pattern) => pattern.is_match(email),
        None => email.contains('@'),
    }
}

pub struct PatientService {
    store: Arc<ClinicalStore>,
}

impl PatientService {
    pub fn new(state: &AppState) -> Self {
        Self::with_store(state.store.clone())
    }

    pub fn with_store(store: Arc<ClinicalStore>) -> Self {
        Self { store }
    }

    /// Front-desk intake of a new patient.
    pub fn create_patient(
        &self,
        actor: &Actor,
        request: CreatePatientRequest,
    ) -> Result<Patient, PatientError> {
        if actor.role != Role::Receptionist {
            warn!("{} attempted patient intake", actor.role);
            return Err(PatientError::Unauthorized);
        }
        self.admit(request)
    }

    /// Validate and store a patient record. Callers decide who may do this.
    pub fn admit(&self, request: CreatePatientRequest) -> Result<Patient, PatientError> {
        let new_patient = request.into_new_patient();
        debug!("Creating new patient profile for: {}", new_patient.email);

        if new_patient.name.is_empty() {
            return Err(PatientError::ValidationError("Name is required".to_string()));
        }
        if !is_valid_email(&new_patient.email) {
            return Err(PatientError::ValidationError(format!(
                "Invalid email address: {}",
                new_patient.email
            )));
        }
        if let Some(dob) = new_patient.date_of_birth {
            validate_date_of_birth(dob, Utc::now().date_naive())?;
        }

        self.store.write(|data| {
            if data.patients.iter().any(|p| p.email.eq_ignore_ascii_case(&new_patient.email)) {
                return Err(PatientError::EmailAlreadyExists {
                    email: new_patient.email.clone(),
                });
            }
            let patient = data.insert_patient(new_patient);
            info!("Patient profile created with ID: {}", patient.id);
            Ok(patient)
        })
    }

    pub fn get_patient(&self, actor: &Actor, patient_id: ClinicalId) -> Result<Patient, PatientError> {
        if !actor.may_view_patient(patient_id) {
            return Err(PatientError::Unauthorized);
        }
        self.store.get_patient(patient_id).ok_or(PatientError::NotFound)
    }

    pub fn find_by_email(&self, email: &str) -> Option<Patient> {
        self.store.read(|data| {
            data.patients
                .iter()
                .find(|p| p.email.eq_ignore_ascii_case(email.trim()))
                .cloned()
        })
    }

    /// Staff-only listing, filtered by name and email.
    pub fn search_patients(
        &self,
        actor: &Actor,
        query: &PatientSearchQuery,
    ) -> Result<Vec<Patient>, PatientError> {
        if actor.role == Role::Patient {
            return Err(PatientError::Unauthorized);
        }

        let limit = query.limit.unwrap_or(usize::MAX);
        Ok(self.store.read(|data| {
            data.patients
                .iter()
                .filter(|p| query.matches(p))
                .take(limit)
                .cloned()
                .collect()
        }))
    }

    pub fn patient_records(
        &self,
        actor: &Actor,
        patient_id: ClinicalId,
    ) -> Result<PatientRecords, PatientError> {
        if !actor.may_view_patient(patient_id) {
            return Err(PatientError::Unauthorized);
        }

        let today = Utc::now().date_naive();
        self.store.read(|data| -> Result<PatientRecords, PatientError> {
            let patient = data.patient(patient_id).cloned().ok_or(PatientError::NotFound)?;
            Ok(PatientRecords {
                age: patient.age_on(today),
                patient,
                appointments: data.appointments_by_patient(patient_id),
                prescriptions: data.prescriptions_by_patient(patient_id),
            })
        })
    }
}

fn validate_date_of_birth(dob: NaiveDate, today: NaiveDate) -> Result<(), PatientError> {
    let too_old = today.years_since(dob).is_some_and(|age| age > 150);
    if dob > today || too_old {
        return Err(PatientError::InvalidDateOfBirth);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn service() -> PatientService {
        PatientService::with_store(Arc::new(ClinicalStore::seeded()))
    }

    fn request(email: &str) -> CreatePatientRequest {
        CreatePatientRequest {
            name: "Jane Roe".to_string(),
            email: email.to_string(),
            phone: "+1-555-0100".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1985, 3, 2),
            gender: Some("Female".to_string()),
            address: None,
        }
    }

    #[test]
    fn receptionist_admits_patient() {
        let service = service();
        let patient = service.create_patient(&Actor::receptionist(), request("jane@example.com")).unwrap();

        assert_eq!(patient.name, "Jane Roe");
        assert_eq!(service.find_by_email("JANE@example.com").map(|p| p.id), Some(patient.id));
    }

    #[test]
    fn intake_is_front_desk_only() {
        assert_matches!(
            service().create_patient(&Actor::doctor(1), request("jane@example.com")),
            Err(PatientError::Unauthorized)
        );
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let result = service().admit(request("Patient@Hospital.com"));
        assert_matches!(result, Err(PatientError::EmailAlreadyExists { .. }));
    }

    #[test]
    fn bad_input_is_rejected() {
        let service = service();
        assert_matches!(service.admit(request("not-an-email")), Err(PatientError::ValidationError(_)));

        let mut future = request("future@example.com");
        future.date_of_birth = NaiveDate::from_ymd_opt(2999, 1, 1);
        assert_matches!(service.admit(future), Err(PatientError::InvalidDateOfBirth));

        let mut nameless = request("nameless@example.com");
        nameless.name = "   ".to_string();
        assert_matches!(service.admit(nameless), Err(PatientError::ValidationError(_)));
    }

    #[test]
    fn search_is_staff_only() {
        let service = service();
        service.admit(request("jane@example.com")).unwrap();

        let query = PatientSearchQuery {
            name: Some("jane".to_string()),
            ..Default::default()
        };
        assert_eq!(service.search_patients(&Actor::doctor(2), &query).unwrap().len(), 1);
        assert_eq!(
            service.search_patients(&Actor::receptionist(), &PatientSearchQuery::default()).unwrap().len(),
            2
        );
        assert_matches!(service.search_patients(&Actor::patient(1), &query), Err(PatientError::Unauthorized));
    }

    #[test]
    fn records_combine_history() {
        let service = service();
        let records = service.patient_records(&Actor::doctor(3), 1).unwrap();

        assert_eq!(records.patient.name, "John Doe");
        assert_eq!(records.appointments.len(), 1);
        assert_eq!(records.prescriptions.len(), 1);
        assert!(records.age.is_some());

        assert_matches!(service.patient_records(&Actor::patient(2), 1), Err(PatientError::Unauthorized));
        assert_matches!(service.get_patient(&Actor::receptionist(), 99), Err(PatientError::NotFound));
    }
}
