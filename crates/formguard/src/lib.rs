//! formguard
//!
//! Server-side form validation: binds a named form to per-field validators,
//! checks submissions against a session-backed CSRF token and a honeypot
//! field, and collects one human-readable error per field.
//!
//! Session state lives behind the [`store::KeyValueStore`] capability.
//! [`session`] bridges it to `tower-sessions`.

pub mod config;
pub mod error;
pub mod form;
pub mod session;
pub mod store;

pub use config::FormConfig;
pub use error::{StoreError, StoreResult};
pub use form::{FieldValue, FormValidator, Validation, Validator, ValidatorKind};
pub use store::{InMemoryStore, KeyValueStore, SessionKey};
