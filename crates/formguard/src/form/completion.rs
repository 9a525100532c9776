//! One-shot "form was just completed" state for post/redirect/get flows.
//!
//! Writes stick until read; every read consumes the entry.

use crate::error::StoreResult;
use crate::store::{KeyValueStore, SessionKey};

const SUBMITTED_FLAG: &str = "1";

/// Raise the submitted flag for `form`.
pub fn mark_completed<S>(store: &S, form: &str) -> StoreResult<()>
where
    S: KeyValueStore + ?Sized,
{
    store.set(
        &SessionKey::Submitted(form.to_string()),
        SUBMITTED_FLAG.to_string(),
    )
}

/// Read and clear the submitted flag for `form`.
pub fn take_completed<S>(store: &S, form: &str) -> StoreResult<bool>
where
    S: KeyValueStore + ?Sized,
{
    Ok(store
        .consume(&SessionKey::Submitted(form.to_string()))?
        .is_some())
}

/// Store the message shown once the completed form is next displayed.
pub fn set_completed_message<S>(store: &S, form: &str, message: String) -> StoreResult<()>
where
    S: KeyValueStore + ?Sized,
{
    store.set(&SessionKey::SubmittedMessage(form.to_string()), message)
}

/// Read and clear the completion message for `form`.
pub fn take_completed_message<S>(store: &S, form: &str) -> StoreResult<Option<String>>
where
    S: KeyValueStore + ?Sized,
{
    store.consume(&SessionKey::SubmittedMessage(form.to_string()))
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    #[test]
    fn test_flag_is_read_once() {
        let store = InMemoryStore::new();
        assert!(!take_completed(&store, "contact").unwrap());

        mark_completed(&store, "contact").unwrap();
        assert!(take_completed(&store, "contact").unwrap());
        assert!(!take_completed(&store, "contact").unwrap());
    }

    #[test]
    fn test_marking_twice_still_fires_once() {
        let store = InMemoryStore::new();
        mark_completed(&store, "contact").unwrap();
        mark_completed(&store, "contact").unwrap();

        assert!(take_completed(&store, "contact").unwrap());
        assert!(!take_completed(&store, "contact").unwrap());
    }

    #[test]
    fn test_message_is_read_once() {
        let store = InMemoryStore::new();
        set_completed_message(&store, "contact", "Thanks!".to_string()).unwrap();

        assert_eq!(
            take_completed_message(&store, "contact").unwrap(),
            Some("Thanks!".to_string())
        );
        assert_eq!(take_completed_message(&store, "contact").unwrap(), None);
    }

    #[test]
    fn test_flag_and_message_are_independent() {
        let store = InMemoryStore::new();
        mark_completed(&store, "contact").unwrap();
        set_completed_message(&store, "contact", "Sent".to_string()).unwrap();

        assert!(take_completed(&store, "contact").unwrap());
        assert_eq!(
            take_completed_message(&store, "contact").unwrap(),
            Some("Sent".to_string())
        );
    }
}
