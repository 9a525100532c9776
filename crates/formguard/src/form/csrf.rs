//! CSRF token generation and verification.
//!
//! One token is kept per form identity. Issuing a new token replaces the old
//! one, so the most recently rendered copy of a form is the only one that
//! verifies. Verification does not consume the token.

use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::StoreResult;
use crate::store::{KeyValueStore, SessionKey};

/// Generate a CSRF token for `form` and store it in the session.
pub fn generate_csrf_token<S>(store: &S, form: &str, entropy_bytes: usize) -> StoreResult<String>
where
    S: KeyValueStore + ?Sized,
{
    let mut random_bytes = vec![0u8; entropy_bytes];
    rand::thread_rng().fill_bytes(&mut random_bytes);

    let timestamp = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(&random_bytes);
    hasher.update(form.as_bytes());
    hasher.update(timestamp.to_le_bytes());
    let token = hex::encode(hasher.finalize());

    store.set(&SessionKey::CsrfToken(form.to_string()), token.clone())?;

    Ok(token)
}

/// Verify a submitted token against the one stored for `form`.
///
/// A missing stored token compares as the empty string, and an empty
/// submission never verifies.
pub fn verify_csrf_token<S>(store: &S, form: &str, submitted: &str) -> StoreResult<bool>
where
    S: KeyValueStore + ?Sized,
{
    let stored = store
        .get(&SessionKey::CsrfToken(form.to_string()))?
        .unwrap_or_default();

    if stored.is_empty() || submitted.is_empty() {
        return Ok(false);
    }

    Ok(stored.as_bytes().ct_eq(submitted.as_bytes()).into())
}

/// Drop the token stored for `form`.
pub fn clear_csrf_token<S>(store: &S, form: &str) -> StoreResult<()>
where
    S: KeyValueStore + ?Sized,
{
    store.remove(&SessionKey::CsrfToken(form.to_string()))
}
