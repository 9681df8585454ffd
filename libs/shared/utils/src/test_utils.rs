use std::sync::Arc;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{Engine as _, engine::general_purpose};
use serde_json::json;

use shared_config::{AppConfig, LifecyclePolicy};
use shared_database::{AppState, ClinicalStore};
use shared_models::auth::{Actor, Role, User};
use shared_models::clinical::ClinicalId;

pub struct TestConfig {
    pub jwt_secret: String,
    pub lifecycle_policy: LifecyclePolicy,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            lifecycle_policy: LifecyclePolicy::Guarded,
        }
    }
}

impl TestConfig {
    pub fn permissive() -> Self {
        Self {
            lifecycle_policy: LifecyclePolicy::Permissive,
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            jwt_secret: self.jwt_secret.clone(),
            lifecycle_policy: self.lifecycle_policy,
            ..AppConfig::default()
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }

    /// Application state over a freshly seeded in-memory store.
    pub fn to_state(&self) -> AppState {
        AppState::new(self.to_app_config(), ClinicalStore::seeded())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub profile_id: Option<ClinicalId>,
}

impl TestUser {
    pub fn new(email: &str, role: Role, profile_id: Option<ClinicalId>) -> Self {
        Self {
            id: format!("account-{}", email),
            email: email.to_string(),
            role,
            profile_id,
        }
    }

    pub fn patient(patient_id: ClinicalId) -> Self {
        Self::new(&format!("patient{}@example.com", patient_id), Role::Patient, Some(patient_id))
    }

    pub fn doctor(doctor_id: ClinicalId) -> Self {
        Self::new(&format!("doctor{}@example.com", doctor_id), Role::Doctor, Some(doctor_id))
    }

    pub fn receptionist() -> Self {
        Self::new("desk@example.com", Role::Receptionist, None)
    }

    pub fn actor(&self) -> Actor {
        Actor {
            role: self.role,
            profile_id: self.profile_id,
        }
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.to_string()),
            profile_id: self.profile_id,
            metadata: None,
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": user.role.to_string(),
            "profile_id": user.profile_id,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }

    pub fn bearer(user: &TestUser, config: &TestConfig) -> String {
        format!("Bearer {}", Self::create_test_token(user, &config.jwt_secret, Some(24)))
    }
}
