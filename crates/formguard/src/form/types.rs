//! Submitted values, error keys, and render-time field descriptors.

use serde::{Deserialize, Serialize};

/// Error-map key used for anti-forgery token failures.
pub const CSRF_ERROR_KEY: &str = "CsrfToken";

/// Error-map key used for honeypot failures.
pub const HONEYPOT_ERROR_KEY: &str = "Honeypot";

/// Suffix appended to the form name for the hidden CSRF field.
pub const CSRF_FIELD_SUFFIX: &str = "_CsrfToken";

/// Suffix appended to the form name for the honeypot field.
pub const HONEYPOT_FIELD_SUFFIX: &str = "_Ident";

/// A raw submitted value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Explicit null, also what validators see for a missing field.
    #[default]
    Null,

    /// Single text value.
    Text(String),

    /// Multi-valued field (checkboxes, multi-select).
    List(Vec<String>),
}

impl FieldValue {
    /// Borrow the text, if this is a single value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the items, if this is a multi-valued field.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Text values come back trimmed; lists and null pass through untouched.
    pub fn trimmed(&self) -> Self {
        match self {
            Self::Text(s) => Self::Text(s.trim().to_string()),
            other => other.clone(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Why a submission was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Missing or mismatched anti-forgery token.
    CsrfToken,

    /// The honeypot field was missing or filled in.
    Honeypot,

    /// A field validator failed.
    Field(String),
}

impl Violation {
    /// Classify an error-map key.
    pub fn from_key(key: &str) -> Self {
        match key {
            CSRF_ERROR_KEY => Self::CsrfToken,
            HONEYPOT_ERROR_KEY => Self::Honeypot,
            field => Self::Field(field.to_string()),
        }
    }

    /// The error-map key for this violation.
    pub fn key(&self) -> &str {
        match self {
            Self::CsrfToken => CSRF_ERROR_KEY,
            Self::Honeypot => HONEYPOT_ERROR_KEY,
            Self::Field(name) => name,
        }
    }

    /// Whether the violation concerns the whole form rather than one field.
    pub fn is_form_level(&self) -> bool {
        !matches!(self, Self::Field(_))
    }
}

/// Validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field name (None for form-level errors).
    pub field: Option<String>,

    /// Error message.
    pub message: String,
}

impl ValidationError {
    /// Create a field-level error.
    pub fn field(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(name.into()),
            message: message.into(),
        }
    }

    /// Create a form-level error.
    pub fn form(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }
}

/// Hidden inputs a rendered form must carry back on submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HiddenFields {
    /// Name of the hidden CSRF input.
    pub csrf_name: String,

    /// Freshly issued token to put in the CSRF input.
    pub csrf_token: String,

    /// Name of the honeypot input, rendered with an empty value.
    pub honeypot_name: String,
}
