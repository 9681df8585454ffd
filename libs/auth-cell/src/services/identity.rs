use async_trait::async_trait;

use crate::models::{AccountPrincipal, AuthError, RegisterRequest};

/// Source of accounts behind the login and registration endpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<AccountPrincipal, AuthError>;

    async fn register(&self, request: RegisterRequest) -> Result<AccountPrincipal, AuthError>;

    async fn principal(&self, account_id: &str) -> Option<AccountPrincipal>;
}
