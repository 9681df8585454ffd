use axum::{
    Router,
    routing::get,
};

use appointment_cell::router::appointment_routes;
use auth_cell::{auth_routes, AuthState};
use doctor_cell::router::doctor_routes;
use patient_cell::router::create_patient_router;
use prescription_cell::router::{medicine_routes, prescription_routes};
use shared_database::AppState;

pub fn create_router(state: AppState, auth_state: AuthState) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic front-desk API is running!" }))
        .nest("/auth", auth_routes(auth_state))
        .nest("/patients", create_patient_router(state.clone()))
        .nest("/doctors", doctor_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/prescriptions", prescription_routes(state.clone()))
        .nest("/medicines", medicine_routes(state))
}
