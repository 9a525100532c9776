//! Form guard configuration, optionally loaded from environment variables.

use std::env;

use anyhow::{Context, Result};

/// Message shown when the anti-forgery token is missing or stale.
pub const DEFAULT_CSRF_MESSAGE: &str = "Please submit the form again";

/// Message shown when the honeypot field was tampered with.
pub const DEFAULT_HONEYPOT_MESSAGE: &str = "Please re-submit the form again";

/// Random bytes mixed into each CSRF token (default: 32).
pub const DEFAULT_TOKEN_ENTROPY_BYTES: usize = 32;

/// Lower bound for token entropy; smaller settings are raised to this.
pub const MIN_TOKEN_ENTROPY_BYTES: usize = 16;

/// Form guard configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormConfig {
    /// Error stored under `CsrfToken` when the token check fails.
    pub csrf_message: String,

    /// Error stored under `Honeypot` when the trap field is filled in.
    pub honeypot_message: String,

    /// Number of random bytes hashed into each CSRF token.
    pub token_entropy_bytes: usize,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            csrf_message: DEFAULT_CSRF_MESSAGE.to_string(),
            honeypot_message: DEFAULT_HONEYPOT_MESSAGE.to_string(),
            token_entropy_bytes: DEFAULT_TOKEN_ENTROPY_BYTES,
        }
    }
}

impl FormConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset variables keep their defaults:
    /// - `FORMGUARD_CSRF_MESSAGE`
    /// - `FORMGUARD_HONEYPOT_MESSAGE`
    /// - `FORMGUARD_TOKEN_BYTES`
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let csrf_message = env::var("FORMGUARD_CSRF_MESSAGE").unwrap_or(defaults.csrf_message);

        let honeypot_message =
            env::var("FORMGUARD_HONEYPOT_MESSAGE").unwrap_or(defaults.honeypot_message);

        let token_entropy_bytes = match env::var("FORMGUARD_TOKEN_BYTES") {
            Ok(raw) => raw
                .trim()
                .parse()
                .context("FORMGUARD_TOKEN_BYTES must be a valid usize")?,
            Err(_) => defaults.token_entropy_bytes,
        };

        Ok(Self {
            csrf_message,
            honeypot_message,
            token_entropy_bytes,
        }
        .normalized())
    }

    /// Set the CSRF failure message.
    pub fn csrf_message(mut self, message: impl Into<String>) -> Self {
        self.csrf_message = message.into();
        self
    }

    /// Set the honeypot failure message.
    pub fn honeypot_message(mut self, message: impl Into<String>) -> Self {
        self.honeypot_message = message.into();
        self
    }

    /// Set the token entropy, clamped to [`MIN_TOKEN_ENTROPY_BYTES`].
    pub fn token_entropy_bytes(mut self, bytes: usize) -> Self {
        self.token_entropy_bytes = bytes;
        self.normalized()
    }

    fn normalized(mut self) -> Self {
        self.token_entropy_bytes = self.token_entropy_bytes.max(MIN_TOKEN_ENTROPY_BYTES);
        self
    }
}
