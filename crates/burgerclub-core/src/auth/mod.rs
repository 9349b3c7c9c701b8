//! Admin gate and credential storage.
//!
//! - `hash_password` / `verify_password`: SHA-256 hex digest compare
//! - `AdminSession`: unlocked admin state persisted to the cache dir,
//!   expiring after 30 minutes
//! - `CredentialStore`: the store API key in the OS keychain
//!
//! The gate keeps casual visitors out of the admin views. It is not a
//! security boundary: anyone holding the API key can write directly.

pub mod admin;
pub mod credentials;
pub mod session;

pub use admin::{
    hash_password, validate_new_password, verify_password, DEFAULT_ADMIN_HASH, MIN_PASSWORD_CHARS,
};
pub use credentials::CredentialStore;
pub use session::{AdminSession, SessionData};
