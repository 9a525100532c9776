//! Field validator capability and the per-field registry.

use std::any::{TypeId, type_name};
use std::fmt;

use super::types::FieldValue;

/// Outcome of running one validator against one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid,

    /// Ordered messages; the first one is what the form reports.
    Invalid(Vec<String>),
}

impl Validation {
    /// Shorthand for a failure with a single message.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(vec![message.into()])
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// First message of a failure.
    pub fn first_message(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid(messages) => messages.first().map(String::as_str),
        }
    }
}

/// A field-level validation rule.
///
/// Concrete rules live outside this crate; forms only rely on this contract.
pub trait Validator: Send {
    fn validate(&self, value: &FieldValue) -> Validation;
}

impl<F> Validator for F
where
    F: Fn(&FieldValue) -> Validation + Send,
{
    fn validate(&self, value: &FieldValue) -> Validation {
        self(value)
    }
}

/// Identifies a validator by its concrete type.
///
/// A field holds at most one validator of each kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValidatorKind {
    id: TypeId,
    name: &'static str,
}

impl ValidatorKind {
    pub fn of<V: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<V>(),
            name: type_name::<V>(),
        }
    }

    /// Type name, for diagnostics only.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for ValidatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

struct Registered {
    kind: ValidatorKind,
    validator: Box<dyn Validator>,
}

/// Validators grouped by field, both levels in registration order.
#[derive(Default)]
pub struct ValidatorSet {
    fields: Vec<(String, Vec<Registered>)>,
}

impl ValidatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a validator, replacing one of the same kind in place.
    pub fn insert<V: Validator + 'static>(&mut self, field: impl Into<String>, validator: V) {
        let field = field.into();
        let entry = Registered {
            kind: ValidatorKind::of::<V>(),
            validator: Box::new(validator),
        };

        let slot = match self.fields.iter().position(|(name, _)| *name == field) {
            Some(index) => &mut self.fields[index].1,
            None => {
                self.fields.push((field, Vec::new()));
                let last = self.fields.len() - 1;
                &mut self.fields[last].1
            }
        };

        match slot.iter_mut().find(|r| r.kind == entry.kind) {
            Some(existing) => *existing = entry,
            None => slot.push(entry),
        }
    }

    /// Remove the validator of `kind` from `field`. Returns whether one was removed.
    pub fn remove(&mut self, field: &str, kind: ValidatorKind) -> bool {
        let Some((_, registered)) = self.fields.iter_mut().find(|(name, _)| name == field) else {
            return false;
        };

        let before = registered.len();
        registered.retain(|r| r.kind != kind);
        registered.len() != before
    }

    /// Whether `field` has a validator of `kind`.
    pub fn contains(&self, field: &str, kind: ValidatorKind) -> bool {
        self.kinds(field).any(|k| k == kind)
    }

    /// Kinds registered for `field`, in registration order.
    pub fn kinds(&self, field: &str) -> impl Iterator<Item = ValidatorKind> {
        self.fields
            .iter()
            .filter(move |(name, _)| name == field)
            .flat_map(|(_, registered)| registered.iter().map(|r| r.kind))
    }

    /// Field names, in registration order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Every (field, validator) pair in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn Validator)> {
        self.fields.iter().flat_map(|(name, registered)| {
            registered
                .iter()
                .map(move |r| (name.as_str(), r.validator.as_ref()))
        })
    }

    /// Total number of registered validators.
    pub fn len(&self) -> usize {
        self.fields.iter().map(|(_, registered)| registered.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ValidatorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, registered) in &self.fields {
            let kinds: Vec<_> = registered.iter().map(|r| r.kind.name()).collect();
            map.entry(name, &kinds);
        }
        map.finish()
    }
}
