use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use patient_cell::{CreatePatientRequest, PatientError};
use shared_models::auth::Role;
use shared_models::clinical::ClinicalId;
use shared_models::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Self-service sign-up. New accounts are always patients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub phone: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub address: Option<String>,
}

impl RegisterRequest {
    pub fn patient_record(&self) -> CreatePatientRequest {
        CreatePatientRequest {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            date_of_birth: self.date_of_birth,
            gender: self.gender.clone(),
            address: self.address.clone(),
        }
    }
}

/// An authenticated account, never carrying its password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountPrincipal {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub profile_id: Option<ClinicalId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub expires_in_hours: i64,
    pub user: AccountPrincipal,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("User already exists with this email")]
    AlreadyExists,

    #[error("Password must be at least {0} characters long")]
    WeakPassword(usize),

    #[error("Authentication is not configured")]
    NotConfigured,

    #[error("Account not found")]
    AccountNotFound,

    #[error("Invalid registration: {0}")]
    InvalidRegistration(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Token issue failed: {0}")]
    TokenIssue(String),
}

impl From<PatientError> for AuthError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::EmailAlreadyExists { .. } => AuthError::AlreadyExists,
            other => AuthError::InvalidRegistration(other.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => AppError::Auth(err.to_string()),
            AuthError::AlreadyExists => AppError::Conflict(err.to_string()),
            AuthError::WeakPassword(_) | AuthError::InvalidRegistration(_) => {
                AppError::ValidationError(err.to_string())
            }
            AuthError::AccountNotFound => AppError::NotFound(err.to_string()),
            AuthError::NotConfigured | AuthError::Hashing(_) | AuthError::TokenIssue(_) => {
                AppError::Internal(err.to_string())
            }
        }
    }
}
