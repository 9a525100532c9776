//! Form validation with built-in anti-forgery and anti-spam checks.
//!
//! A [`FormValidator`] is bound to a form name. It supports:
//! - Per-field validators keyed by their concrete type
//! - CSRF token issuance and verification against the session store
//! - A honeypot field that humans leave empty and bots fill in
//! - One-shot completion state for post/redirect/get flows

mod completion;
pub mod csrf;
mod rules;
mod service;
mod types;

pub use csrf::{clear_csrf_token, generate_csrf_token, verify_csrf_token};
pub use rules::{Validation, Validator, ValidatorKind, ValidatorSet};
pub use service::FormValidator;
pub use types::{
    CSRF_ERROR_KEY, CSRF_FIELD_SUFFIX, FieldValue, HONEYPOT_ERROR_KEY, HONEYPOT_FIELD_SUFFIX,
    HiddenFields, ValidationError, Violation,
};
