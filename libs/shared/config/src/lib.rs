use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// How strictly appointment status changes are checked against the lifecycle graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePolicy {
    /// Only transitions along the lifecycle graph are accepted.
    #[default]
    Guarded,
    /// Any named transition is applied regardless of the current status.
    Permissive,
}

impl FromStr for LifecyclePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "guarded" => Ok(LifecyclePolicy::Guarded),
            "permissive" => Ok(LifecyclePolicy::Permissive),
            other => Err(format!("Unknown lifecycle policy: {}", other)),
        }
    }
}

impl fmt::Display for LifecyclePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecyclePolicy::Guarded => write!(f, "guarded"),
            LifecyclePolicy::Permissive => write!(f, "permissive"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub bind_addr: String,
    pub snapshot_path: Option<PathBuf>,
    pub lifecycle_policy: LifecyclePolicy,
    pub enforce_slot_catalog: bool,
    pub reject_double_booking: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_hours: 24,
            bind_addr: "0.0.0.0:3000".to_string(),
            snapshot_path: None,
            lifecycle_policy: LifecyclePolicy::Guarded,
            enforce_slot_catalog: false,
            reject_double_booking: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            jwt_secret: env::var("CLINIC_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("CLINIC_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            token_ttl_hours: env::var("CLINIC_TOKEN_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.token_ttl_hours),
            bind_addr: env::var("CLINIC_BIND_ADDR")
                .unwrap_or_else(|_| {
                    warn!("CLINIC_BIND_ADDR not set, using default");
                    defaults.bind_addr.clone()
                }),
            snapshot_path: env::var("CLINIC_SNAPSHOT_PATH")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            lifecycle_policy: match env::var("CLINIC_LIFECYCLE_POLICY") {
                Ok(value) => value.parse().unwrap_or_else(|e| {
                    warn!("{}, falling back to guarded", e);
                    LifecyclePolicy::Guarded
                }),
                Err(_) => defaults.lifecycle_policy,
            },
            enforce_slot_catalog: env_flag("CLINIC_ENFORCE_SLOT_CATALOG"),
            reject_double_booking: env_flag("CLINIC_REJECT_DOUBLE_BOOKING"),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        if !config.is_persistent() {
            warn!("CLINIC_SNAPSHOT_PATH not set, clinical data will not survive restarts");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.jwt_secret.is_empty()
    }

    pub fn is_persistent(&self) -> bool {
        self.snapshot_path.is_some()
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}
