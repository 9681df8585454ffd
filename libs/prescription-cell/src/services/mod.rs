pub mod issuance;

pub use issuance::PrescriptionService;
