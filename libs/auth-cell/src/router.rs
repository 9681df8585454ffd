use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
    middleware,
};

use shared_database::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::services::IdentityProvider;

#[derive(Clone)]
pub struct AuthState {
    pub app: AppState,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AuthState {
    pub fn new(app: AppState, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { app, identity }
    }
}

pub fn auth_routes(state: AuthState) -> Router {
    let public_routes = Router::new()
        .route("/login", post(handlers::login))
        .route("/register", post(handlers::register))
        .route("/validate", post(handlers::validate_token))
        .route("/verify", post(handlers::verify_token));

    let protected_routes = Router::new()
        .route("/profile", get(handlers::get_profile))
        .layer(middleware::from_fn_with_state(state.app.config.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
