use std::sync::Arc;

use tracing::{debug, error};

use shared_config::AppConfig;
use shared_utils::jwt::{issue_token, TokenSubject};

use crate::models::{AccountPrincipal, AuthError, AuthResponse, LoginRequest, RegisterRequest};
use crate::services::identity::IdentityProvider;

/// Exchanges credentials for signed tokens.
pub struct SessionService {
    identity: Arc<dyn IdentityProvider>,
    config: Arc<AppConfig>,
}

impl SessionService {
    pub fn new(identity: Arc<dyn IdentityProvider>, config: Arc<AppConfig>) -> Self {
        Self { identity, config }
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        self.ensure_configured()?;
        let principal = self.identity.login(&request.email, &request.password).await?;
        self.respond(principal)
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AuthError> {
        self.ensure_configured()?;
        let principal = self.identity.register(request).await?;
        self.respond(principal)
    }

    fn ensure_configured(&self) -> Result<(), AuthError> {
        if !self.config.is_configured() {
            error!("Token signing secret is not configured");
            return Err(AuthError::NotConfigured);
        }
        Ok(())
    }

    fn respond(&self, principal: AccountPrincipal) -> Result<AuthResponse, AuthError> {
        let subject = TokenSubject {
            account_id: &principal.id,
            email: &principal.email,
            role: principal.role,
            profile_id: principal.profile_id,
        };
        let token = issue_token(&subject, &self.config.jwt_secret, self.config.token_ttl_hours)
            .map_err(AuthError::TokenIssue)?;

        debug!("Issued session for account {}", principal.id);
        Ok(AuthResponse {
            token,
            expires_in_hours: self.config.token_ttl_hours,
            user: principal,
        })
    }
}
