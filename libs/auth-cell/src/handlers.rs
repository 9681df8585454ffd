use axum::{
    extract::{Extension, Json, State},
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use tracing::debug;

use shared_models::auth::{Role, TokenResponse, User};
use shared_models::error::AppError;
use shared_utils::jwt::validate_token as decode_token;

use crate::models::{AuthError, AuthResponse, LoginRequest, RegisterRequest};
use crate::router::AuthState;
use crate::services::SessionService;

fn sessions(state: &AuthState) -> SessionService {
    SessionService::new(state.identity.clone(), state.app.config.clone())
}

pub async fn login(
    State(state): State<AuthState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let response = sessions(&state).login(request).await?;
    Ok(Json(response))
}

pub async fn register(
    State(state): State<AuthState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let response = sessions(&state).register(request).await?;
    Ok(Json(response))
}

pub async fn validate_token(
    State(state): State<AuthState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<TokenResponse>, AppError> {
    debug!("Validating token");

    let user = decode_token(auth.token(), &state.app.config.jwt_secret).map_err(AppError::Auth)?;

    Ok(Json(TokenResponse {
        valid: true,
        user_id: user.id,
        email: user.email,
        role: user.role,
        profile_id: user.profile_id,
    }))
}

pub async fn verify_token(
    State(state): State<AuthState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Json<Value> {
    debug!("Verifying token");

    let valid = decode_token(auth.token(), &state.app.config.jwt_secret).is_ok();
    Json(json!({ "valid": valid }))
}

pub async fn get_profile(
    State(state): State<AuthState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    debug!("Getting profile for user: {}", user.id);

    let principal = state
        .identity
        .principal(&user.id)
        .await
        .ok_or(AuthError::AccountNotFound)?;

    let record = match (principal.role, principal.profile_id) {
        (Role::Patient, Some(id)) => state.app.store.get_patient(id).map(|p| json!(p)),
        (Role::Doctor, Some(id)) => state.app.store.get_doctor(id).map(|d| json!(d)),
        _ => None,
    };

    Ok(Json(json!({
        "user": principal,
        "record": record
    })))
}
