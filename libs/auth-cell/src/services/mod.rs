pub mod directory;
pub mod identity;
pub mod session;

pub use directory::AccountDirectory;
pub use identity::IdentityProvider;
pub use session::SessionService;
