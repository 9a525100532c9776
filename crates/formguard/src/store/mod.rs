//! Session-scoped key-value storage used by forms.
//!
//! Forms never touch ambient session state directly. Everything that has to
//! outlive a single request (the issued CSRF token, the "just completed" flag
//! and its message) goes through a [`KeyValueStore`], addressed by a
//! [`SessionKey`] that is scoped to the form's identity.

mod memory;

use std::fmt;
use std::sync::Arc;

use crate::error::StoreResult;

pub use memory::InMemoryStore;

/// A session entry owned by one form identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SessionKey {
    /// The CSRF token most recently issued for the form.
    CsrfToken(String),

    /// One-shot "form was submitted" flag.
    Submitted(String),

    /// One-shot message shown after a completed submission.
    SubmittedMessage(String),
}

impl SessionKey {
    /// The form identity this key belongs to.
    pub fn form(&self) -> &str {
        match self {
            Self::CsrfToken(form) | Self::Submitted(form) | Self::SubmittedMessage(form) => form,
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CsrfToken(form) => write!(f, "CsrfToken[{form}]"),
            Self::Submitted(form) => write!(f, "{form}.submitted"),
            Self::SubmittedMessage(form) => write!(f, "{form}.submitted_message"),
        }
    }
}

/// External key-value store backing a user's session.
///
/// Implementations must isolate entries per session and persist them across
/// requests within that session. Methods take `&self`; stores use interior
/// mutability.
pub trait KeyValueStore {
    /// Read an entry without removing it.
    fn get(&self, key: &SessionKey) -> StoreResult<Option<String>>;

    /// Write an entry, replacing any previous value.
    fn set(&self, key: &SessionKey, value: String) -> StoreResult<()>;

    /// Read and delete an entry in one step.
    fn consume(&self, key: &SessionKey) -> StoreResult<Option<String>>;

    /// Delete an entry if present.
    fn remove(&self, key: &SessionKey) -> StoreResult<()> {
        self.consume(key).map(|_| ())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &SessionKey) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &SessionKey, value: String) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn consume(&self, key: &SessionKey) -> StoreResult<Option<String>> {
        (**self).consume(key)
    }

    fn remove(&self, key: &SessionKey) -> StoreResult<()> {
        (**self).remove(key)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &SessionKey) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &SessionKey, value: String) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn consume(&self, key: &SessionKey) -> StoreResult<Option<String>> {
        (**self).consume(key)
    }

    fn remove(&self, key: &SessionKey) -> StoreResult<()> {
        (**self).remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_key_layout() {
        assert_eq!(
            SessionKey::CsrfToken("contact".into()).to_string(),
            "CsrfToken[contact]"
        );
        assert_eq!(
            SessionKey::Submitted("contact".into()).to_string(),
            "contact.submitted"
        );
        assert_eq!(
            SessionKey::SubmittedMessage("contact".into()).to_string(),
            "contact.submitted_message"
        );
    }

    #[test]
    fn test_session_key_form() {
        assert_eq!(SessionKey::Submitted("signup".into()).form(), "signup");
    }
}
