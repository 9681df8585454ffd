use std::sync::Arc;

use axum::{
    extract::State,
    middleware::Next,
    response::Response,
    body::Body,
};
use http::Request;

use shared_config::AppConfig;
use shared_models::auth::{Actor, User};
use shared_models::error::AppError;

use crate::jwt::validate_token;

/// Pull the bearer token out of an `Authorization` header value.
pub fn bearer_token(auth_value: &str) -> Result<&str, AppError> {
    auth_value
        .strip_prefix("Bearer ")
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))
}

pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    let token = bearer_token(auth_value)?;

    let user = validate_token(token, &config.jwt_secret)
        .map_err(AppError::Auth)?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Map the authenticated user onto the actor used for store authorization.
pub fn require_actor(user: &User) -> Result<Actor, AppError> {
    user.actor()
        .ok_or_else(|| AppError::Forbidden(format!("User {} has no clinic role", user.id)))
}
