//! formguard test utilities.
//!
//! Stub validators, a submission builder, and tracing setup for integration
//! tests. Concrete validation rules are not part of formguard; these stubs
//! only exercise the validator contract.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Once;
use std::sync::atomic::{AtomicUsize, Ordering};

use formguard::form::{CSRF_FIELD_SUFFIX, HONEYPOT_FIELD_SUFFIX};
use formguard::{FieldValue, FormValidator, KeyValueStore, Validation, Validator};
use tracing_subscriber::EnvFilter;

/// Install a test-friendly tracing subscriber once per test binary.
///
/// Honors `RUST_LOG`; defaults to `formguard=debug`.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("formguard=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Fails on missing, null, or blank values.
#[derive(Debug, Clone)]
pub struct Required {
    pub message: String,
}

impl Required {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for Required {
    fn default() -> Self {
        Self::new("Value is required")
    }
}

impl Validator for Required {
    fn validate(&self, value: &FieldValue) -> Validation {
        let present = match value {
            FieldValue::Null => false,
            FieldValue::Text(s) => !s.trim().is_empty(),
            FieldValue::List(items) => !items.is_empty(),
        };

        if present {
            Validation::Valid
        } else {
            Validation::invalid(self.message.clone())
        }
    }
}

/// Fails unless the text contains an `@`.
#[derive(Debug, Clone, Default)]
pub struct HasAt;

impl Validator for HasAt {
    fn validate(&self, value: &FieldValue) -> Validation {
        match value.as_str() {
            Some(s) if s.contains('@') => Validation::Valid,
            _ => Validation::Invalid(vec![
                "Not an email address".to_string(),
                "Missing @".to_string(),
            ]),
        }
    }
}

/// Returns a fixed outcome and counts how often it ran.
#[derive(Debug, Clone)]
pub struct Scripted {
    outcome: Validation,
    calls: Arc<AtomicUsize>,
}

impl Scripted {
    /// Always passes.
    pub fn pass() -> Self {
        Self {
            outcome: Validation::Valid,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Always fails with the given messages.
    pub fn fail<I, M>(messages: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        Self {
            outcome: Validation::Invalid(messages.into_iter().map(Into::into).collect()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared call counter, readable after the validator moves into a form.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl Validator for Scripted {
    fn validate(&self, _value: &FieldValue) -> Validation {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

/// Second scripted kind, so one field can carry two distinct stubs.
#[derive(Debug, Clone)]
pub struct ScriptedAlt(pub Scripted);

impl Validator for ScriptedAlt {
    fn validate(&self, value: &FieldValue) -> Validation {
        self.0.validate(value)
    }
}

/// Read a shared call counter.
pub fn call_count(calls: &Arc<AtomicUsize>) -> usize {
    calls.load(Ordering::SeqCst)
}

/// Builds a submission for a named form.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    form: String,
    values: HashMap<String, FieldValue>,
}

impl Submission {
    /// Start an empty submission for `form`.
    pub fn new(form: impl Into<String>) -> Self {
        Self {
            form: form.into(),
            values: HashMap::new(),
        }
    }

    /// A submission carrying a freshly issued token and an empty honeypot,
    /// i.e. what a browser posts back from a correctly rendered form.
    pub fn rendered<S: KeyValueStore>(form: &FormValidator<S>) -> Self {
        let hidden = form
            .hidden_fields()
            .unwrap_or_else(|e| panic!("failed to issue CSRF token: {e}"));

        Self::new(form.name())
            .field(hidden.csrf_name, hidden.csrf_token)
            .field(hidden.honeypot_name, "")
    }

    /// Set the CSRF field.
    pub fn csrf(self, token: impl Into<FieldValue>) -> Self {
        let name = format!("{}{CSRF_FIELD_SUFFIX}", self.form);
        self.field(name, token)
    }

    /// Set the honeypot field.
    pub fn honeypot(self, value: impl Into<FieldValue>) -> Self {
        let name = format!("{}{HONEYPOT_FIELD_SUFFIX}", self.form);
        self.field(name, value)
    }

    /// Remove a field.
    pub fn without(mut self, name: &str) -> Self {
        self.values.remove(name);
        self
    }

    /// Set any field.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn build(self) -> HashMap<String, FieldValue> {
        self.values
    }
}
