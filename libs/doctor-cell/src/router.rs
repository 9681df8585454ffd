use axum::{routing::get, Router};

use shared_database::AppState;

use crate::handlers;

/// The doctor catalog and slot boards are public reads.
pub fn doctor_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::search_doctors))
        .route("/available", get(handlers::find_available_doctors))
        .route("/{doctor_id}", get(handlers::get_doctor))
        .route("/{doctor_id}/slots", get(handlers::get_slot_board))
        .with_state(state)
}
