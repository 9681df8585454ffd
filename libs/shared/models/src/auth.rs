use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clinical::ClinicalId;

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtHeader {
    pub alg: String,
    pub typ: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: Option<u64>,
    pub email: Option<String>,
    pub role: Option<String>,
    /// Patient or doctor record the account is linked to.
    pub profile_id: Option<ClinicalId>,
    pub user_metadata: Option<serde_json::Value>,
    pub iat: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub profile_id: Option<ClinicalId>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Resolve the acting role and linked profile for authorization checks.
    pub fn actor(&self) -> Option<Actor> {
        let role = self.role.as_deref()?.parse().ok()?;
        Some(Actor {
            role,
            profile_id: self.profile_id,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub valid: bool,
    pub user_id: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub profile_id: Option<ClinicalId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Patient,
    Doctor,
    Receptionist,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Patient => write!(f, "patient"),
            Role::Doctor => write!(f, "doctor"),
            Role::Receptionist => write!(f, "receptionist"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "patient" => Ok(Role::Patient),
            "doctor" => Ok(Role::Doctor),
            "receptionist" => Ok(Role::Receptionist),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// The principal performing a store mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub role: Role,
    pub profile_id: Option<ClinicalId>,
}

impl Actor {
    pub fn patient(patient_id: ClinicalId) -> Self {
        Self { role: Role::Patient, profile_id: Some(patient_id) }
    }

    pub fn doctor(doctor_id: ClinicalId) -> Self {
        Self { role: Role::Doctor, profile_id: Some(doctor_id) }
    }

    pub fn receptionist() -> Self {
        Self { role: Role::Receptionist, profile_id: None }
    }

    /// True when the actor is the patient with the given id.
    pub fn is_patient(&self, patient_id: ClinicalId) -> bool {
        self.role == Role::Patient && self.profile_id == Some(patient_id)
    }

    /// True when the actor is the doctor with the given id.
    pub fn is_doctor(&self, doctor_id: ClinicalId) -> bool {
        self.role == Role::Doctor && self.profile_id == Some(doctor_id)
    }

    /// Patient records are open to staff and to the patient themself.
    pub fn may_view_patient(&self, patient_id: ClinicalId) -> bool {
        matches!(self.role, Role::Receptionist | Role::Doctor) || self.is_patient(patient_id)
    }

    /// A doctor's schedule is open to the front desk and to that doctor.
    pub fn may_view_doctor_schedule(&self, doctor_id: ClinicalId) -> bool {
        self.role == Role::Receptionist || self.is_doctor(doctor_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_without_known_role_has_no_actor() {
        let user = User {
            id: "7".to_string(),
            email: None,
            role: Some("admin".to_string()),
            profile_id: None,
            metadata: None,
            created_at: None,
        };
        assert!(user.actor().is_none());
    }

    #[test]
    fn actor_ownership_checks_role_and_profile() {
        let actor = Actor::patient(1);
        assert!(actor.is_patient(1));
        assert!(!actor.is_patient(2));
        assert!(!actor.is_doctor(1));
        assert!(!Actor::receptionist().is_patient(1));
    }

    #[test]
    fn patients_only_see_their_own_records() {
        assert!(Actor::patient(1).may_view_patient(1));
        assert!(!Actor::patient(1).may_view_patient(2));
        assert!(Actor::doctor(3).may_view_patient(2));
        assert!(Actor::receptionist().may_view_patient(2));
        assert!(!Actor::doctor(3).may_view_doctor_schedule(1));
    }
}
