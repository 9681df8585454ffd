use std::sync::{Arc, PoisonError, RwLock};

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use patient_cell::services::PatientService;
use shared_database::ClinicalStore;
use shared_models::auth::Role;
use shared_models::clinical::ClinicalId;

use crate::models::{AccountPrincipal, AuthError, RegisterRequest};
use crate::services::identity::IdentityProvider;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const DEMO_PASSWORD: &str = "password123";

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::Hashing(e.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Hashing(e.to_string())),
    }
}

#[derive(Debug, Clone)]
struct Account {
    principal: AccountPrincipal,
    password_hash: String,
}

/// In-memory accounts; patient sign-ups also create the patient record.
pub struct AccountDirectory {
    accounts: RwLock<Vec<Account>>,
    patients: PatientService,
}

impl AccountDirectory {
    pub fn new(store: Arc<ClinicalStore>) -> Self {
        Self {
            accounts: RwLock::new(Vec::new()),
            patients: PatientService::with_store(store),
        }
    }

    /// Directory holding the three front-desk demo logins.
    pub fn seeded(store: Arc<ClinicalStore>) -> Result<Self, AuthError> {
        let directory = Self::new(store);
        let demo = [
            ("1", "patient@hospital.com", "John Doe", Role::Patient, Some(1)),
            ("2", "doctor@hospital.com", "Dr. Sarah Smith", Role::Doctor, Some(1)),
            ("3", "receptionist@hospital.com", "Mary Johnson", Role::Receptionist, None),
        ];
        for (id, email, name, role, profile_id) in demo {
            directory.insert(
                AccountPrincipal {
                    id: id.to_string(),
                    email: email.to_string(),
                    name: name.to_string(),
                    role,
                    profile_id,
                },
                DEMO_PASSWORD,
            )?;
        }
        Ok(directory)
    }

    /// Add an account directly, bypassing registration rules.
    pub fn insert(&self, principal: AccountPrincipal, password: &str) -> Result<(), AuthError> {
        let password_hash = hash_password(password)?;
        let mut accounts = self.accounts.write().unwrap_or_else(PoisonError::into_inner);
        if accounts.iter().any(|a| a.principal.email.eq_ignore_ascii_case(&principal.email)) {
            return Err(AuthError::AlreadyExists);
        }
        accounts.push(Account { principal, password_hash });
        Ok(())
    }

    fn find_by_email(&self, email: &str) -> Option<Account> {
        let accounts = self.accounts.read().unwrap_or_else(PoisonError::into_inner);
        accounts
            .iter()
            .find(|a| a.principal.email.eq_ignore_ascii_case(email.trim()))
            .cloned()
    }

    fn account_id_for(patient_id: ClinicalId) -> String {
        format!("patient-{}", patient_id)
    }
}

#[async_trait]
impl IdentityProvider for AccountDirectory {
    #[instrument(skip(self, password))]
    async fn login(&self, email: &str, password: &str) -> Result<AccountPrincipal, AuthError> {
        let Some(account) = self.find_by_email(email) else {
            warn!("Login attempt for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &account.password_hash)? {
            warn!("Wrong password for account {}", account.principal.id);
            return Err(AuthError::InvalidCredentials);
        }

        debug!("Account {} logged in", account.principal.id);
        Ok(account.principal)
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    async fn register(&self, request: RegisterRequest) -> Result<AccountPrincipal, AuthError> {
        if request.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword(MIN_PASSWORD_LENGTH));
        }
        let password_hash = hash_password(&request.password)?;

        // Held across patient creation so two sign-ups with one email cannot both pass.
        let mut accounts = self.accounts.write().unwrap_or_else(PoisonError::into_inner);
        if accounts.iter().any(|a| a.principal.email.eq_ignore_ascii_case(request.email.trim())) {
            return Err(AuthError::AlreadyExists);
        }

        // A front-desk intake record without a login is claimed rather than duplicated.
        let claimed = |id: ClinicalId| {
            accounts
                .iter()
                .any(|a| a.principal.role == Role::Patient && a.principal.profile_id == Some(id))
        };
        let patient = match self.patients.find_by_email(&request.email) {
            Some(existing) if !claimed(existing.id) => {
                info!("Linking new account to existing patient {}", existing.id);
                existing
            }
            Some(_) => return Err(AuthError::AlreadyExists),
            None => self.patients.admit(request.patient_record())?,
        };
        let principal = AccountPrincipal {
            id: Self::account_id_for(patient.id),
            email: patient.email.clone(),
            name: patient.name.clone(),
            role: Role::Patient,
            profile_id: Some(patient.id),
        };
        accounts.push(Account {
            principal: principal.clone(),
            password_hash,
        });

        info!("Registered patient account {}", principal.id);
        Ok(principal)
    }

    async fn principal(&self, account_id: &str) -> Option<AccountPrincipal> {
        let accounts = self.accounts.read().unwrap_or_else(PoisonError::into_inner);
        accounts.iter().find(|a| a.principal.id == account_id).map(|a| a.principal.clone())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn directory() -> (Arc<ClinicalStore>, AccountDirectory) {
        let store = Arc::new(ClinicalStore::seeded());
        let directory = AccountDirectory::seeded(store.clone()).unwrap();
        (store, directory)
    }

    fn registration(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Jane Roe".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            phone: "+1-555-0100".to_string(),
            date_of_birth: None,
            gender: None,
            address: None,
        }
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[tokio::test]
    async fn demo_accounts_log_in() {
        let (_, directory) = directory();

        let doctor = directory.login("doctor@hospital.com", DEMO_PASSWORD).await.unwrap();
        assert_eq!(doctor.role, Role::Doctor);
        assert_eq!(doctor.profile_id, Some(1));

        assert_matches!(
            directory.login("doctor@hospital.com", "nope").await,
            Err(AuthError::InvalidCredentials)
        );
        assert_matches!(
            directory.login("ghost@hospital.com", DEMO_PASSWORD).await,
            Err(AuthError::InvalidCredentials)
        );
    }

    #[tokio::test]
    async fn registration_creates_patient_record() {
        let (store, directory) = directory();

        let principal = directory.register(registration("jane@example.com", "s3cret-pass")).await.unwrap();

        let patient_id = principal.profile_id.unwrap();
        assert_eq!(principal.role, Role::Patient);
        assert_eq!(store.get_patient(patient_id).unwrap().name, "Jane Roe");
        assert_eq!(directory.principal(&principal.id).await, Some(principal.clone()));
        assert_eq!(directory.login("jane@example.com", "s3cret-pass").await.unwrap(), principal);
    }

    #[tokio::test]
    async fn registration_claims_front_desk_intake_record() {
        let (store, directory) = directory();
        let intake = PatientService::with_store(store.clone())
            .admit(registration("walk.in@example.com", "unused").patient_record())
            .unwrap();
        let before = store.patients().len();

        let principal = directory.register(registration("Walk.In@example.com", "s3cret-pass")).await.unwrap();

        assert_eq!(principal.profile_id, Some(intake.id));
        assert_eq!(store.patients().len(), before);
        assert_matches!(
            directory.register(registration("walk.in@example.com", "s3cret-pass")).await,
            Err(AuthError::AlreadyExists)
        );
    }

    #[tokio::test]
    async fn registration_rejects_taken_email_and_short_password() {
        let (store, directory) = directory();
        let before = store.patients().len();

        assert_matches!(
            directory.register(registration("receptionist@hospital.com", "long-enough")).await,
            Err(AuthError::AlreadyExists)
        );
        assert_matches!(
            directory.register(registration("new@example.com", "short")).await,
            Err(AuthError::WeakPassword(MIN_PASSWORD_LENGTH))
        );
        assert_matches!(
            directory.register(registration("not-an-email", "long-enough")).await,
            Err(AuthError::InvalidRegistration(_))
        );
        assert_eq!(store.patients().len(), before);
    }
}
