// libs/prescription-cell/src/router.rs
use axum::{
    Router,
    routing::{get, post},
    middleware,
};

use shared_database::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn prescription_routes(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/", post(handlers::issue_prescription))
        .route("/patients/{patient_id}", get(handlers::get_patient_prescriptions))
        .route("/{prescription_id}", get(handlers::get_prescription))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}

/// Medicine catalog reads are public.
pub fn medicine_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::list_medicines))
        .route("/{medicine_id}", get(handlers::get_medicine))
        .with_state(state)
}
