//! Bridge between `tower-sessions` and the synchronous form store.
//!
//! A request loads the form entries out of its session once, runs every form
//! operation against the resulting [`InMemoryStore`], and writes the entries
//! back before the response is sent.

use std::collections::HashMap;

use anyhow::{Context, Result};
use tower_sessions::Session;

use crate::store::InMemoryStore;

/// Session key holding every form entry for this session.
pub const FORM_SESSION_KEY: &str = "formguard";

/// Load the form entries stored in the session.
pub async fn load_store(session: &Session) -> Result<InMemoryStore> {
    let entries: HashMap<String, String> = session
        .get(FORM_SESSION_KEY)
        .await
        .context("failed to read form entries from session")?
        .unwrap_or_default();

    tracing::debug!(entries = entries.len(), "loaded form entries from session");

    Ok(InMemoryStore::from_entries(entries))
}

/// Write the form entries back to the session.
///
/// Nothing is written when the store was only read from. An emptied store
/// removes the session entry altogether.
pub async fn save_store(session: &Session, store: &InMemoryStore) -> Result<()> {
    if !store.is_dirty() {
        return Ok(());
    }

    let entries = store.entries();

    if entries.is_empty() {
        session
            .remove::<HashMap<String, String>>(FORM_SESSION_KEY)
            .await
            .map_err(|e| anyhow::anyhow!("failed to clear form entries: {}", e))?;
        return Ok(());
    }

    session
        .insert(FORM_SESSION_KEY, entries)
        .await
        .map_err(|e| anyhow::anyhow!("failed to store form entries: {}", e))?;

    Ok(())
}
