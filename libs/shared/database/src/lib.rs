pub mod seed;
pub mod snapshot;
pub mod state;
pub mod store;

pub use state::AppState;
pub use store::{ClinicalData, ClinicalStore};
