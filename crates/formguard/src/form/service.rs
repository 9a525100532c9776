//! Form validator: binds a named form to its field validators and runs the
//! CSRF, honeypot, and field checks against a submission.

use std::any::type_name;
use std::collections::{BTreeMap, HashMap};

use tracing::{debug, warn};

use crate::config::FormConfig;
use crate::error::StoreResult;
use crate::store::KeyValueStore;

use super::completion::{
    mark_completed, set_completed_message, take_completed, take_completed_message,
};
use super::csrf::{clear_csrf_token, generate_csrf_token, verify_csrf_token};
use super::rules::{Validation, Validator, ValidatorKind, ValidatorSet};
use super::types::{
    CSRF_FIELD_SUFFIX, FieldValue, HONEYPOT_FIELD_SUFFIX, HiddenFields, ValidationError, Violation,
};

/// Validates submissions for one named form.
///
/// Built once per request: register validators right after construction,
/// then call [`is_valid`](Self::is_valid) once per submission attempt. The
/// CSRF token and completion state outlive the instance in the session store,
/// addressed by the form name.
#[derive(Debug)]
pub struct FormValidator<S> {
    name: String,
    validators: ValidatorSet,
    values: HashMap<String, FieldValue>,
    errors: BTreeMap<String, String>,
    valid: bool,
    store: S,
    config: FormConfig,
}

impl<S: KeyValueStore> FormValidator<S> {
    /// Create a form validator. An empty name falls back to `FormValidator`.
    pub fn new(name: impl Into<String>, store: S) -> Self {
        let name = name.into();
        let name = if name.is_empty() {
            short_type_name::<Self>().to_string()
        } else {
            name
        };

        Self {
            name,
            validators: ValidatorSet::new(),
            values: HashMap::new(),
            errors: BTreeMap::new(),
            valid: true,
            store,
            config: FormConfig::default(),
        }
    }

    /// Create a form validator named after the type `T`, e.g. `ContactForm`.
    pub fn named<T: ?Sized>(store: S) -> Self {
        Self::new(short_type_name::<T>(), store)
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: FormConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Register a validator for a field.
    ///
    /// A validator of the same type already on that field is replaced in place.
    pub fn add_validator<V: Validator + 'static>(
        &mut self,
        field: impl Into<String>,
        validator: V,
    ) -> &mut Self {
        self.validators.insert(field, validator);
        self
    }

    /// Remove the validator of `kind` from a field, if present.
    pub fn remove_validator(&mut self, field: &str, kind: ValidatorKind) -> &mut Self {
        if !self.validators.remove(field, kind) {
            debug!(form = %self.name, field = %field, kind = %kind, "no validator to remove");
        }
        self
    }

    pub fn validators(&self) -> &ValidatorSet {
        &self.validators
    }

    /// Check a submission.
    ///
    /// Runs in order, stopping at the first failing security check:
    /// 1. an empty submission is valid and nothing else runs;
    /// 2. the CSRF token must match the one issued for this form;
    /// 3. the honeypot field must be present and empty;
    /// 4. every registered validator runs, each field keeping the first
    ///    failure message it receives.
    pub fn is_valid(&mut self, values: HashMap<String, FieldValue>) -> bool {
        self.valid = true;
        self.values = values;
        self.errors.clear();

        if self.values.is_empty() {
            debug!(form = %self.name, "empty submission");
            return self.valid;
        }

        if !self.check_csrf_token() {
            warn!(form = %self.name, "CSRF token missing or mismatched");
            let message = self.config.csrf_message.clone();
            self.reject(Violation::CsrfToken, message);
            return self.valid;
        }

        if !self.check_honeypot() {
            warn!(form = %self.name, "honeypot field tripped");
            let message = self.config.honeypot_message.clone();
            self.reject(Violation::Honeypot, message);
            return self.valid;
        }

        let missing = FieldValue::Null;
        for (field, validator) in self.validators.iter() {
            let value = self.values.get(field).unwrap_or(&missing);

            if let Validation::Invalid(messages) = validator.validate(value) {
                debug!(form = %self.name, field = %field, "field validation failed");
                let message = messages.into_iter().next().unwrap_or_default();
                self.errors.entry(field.to_string()).or_insert(message);
                self.valid = false;
            }
        }

        debug!(form = %self.name, valid = self.valid, "form validated");
        self.valid
    }

    fn check_csrf_token(&self) -> bool {
        let field = self.csrf_field_name();
        let Some(submitted) = self.values.get(&field) else {
            return false;
        };
        let Some(submitted) = submitted.as_str() else {
            return false;
        };

        match verify_csrf_token(&self.store, &self.name, submitted) {
            Ok(matches) => matches,
            Err(e) => {
                warn!(form = %self.name, error = %e, "failed to read CSRF token from session");
                false
            }
        }
    }

    fn check_honeypot(&self) -> bool {
        matches!(
            self.values.get(&self.honeypot_field_name()),
            Some(FieldValue::Text(s)) if s.is_empty()
        )
    }

    fn reject(&mut self, violation: Violation, message: String) {
        self.errors.insert(violation.key().to_string(), message);
        self.valid = false;
    }

    /// Result of the most recent check, including any forced errors since.
    pub fn validity(&self) -> bool {
        self.valid
    }

    /// Rename the form. Tokens issued under the old name no longer verify.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_value(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.values.insert(field.into(), value.into());
    }

    /// Replace every value.
    pub fn set_values(&mut self, values: HashMap<String, FieldValue>) {
        self.values = values;
    }

    /// A submitted value for display.
    ///
    /// Missing fields read as empty text, text is trimmed, and lists or null
    /// come back unchanged.
    pub fn value(&self, field: &str) -> FieldValue {
        self.values
            .get(field)
            .map_or_else(|| FieldValue::Text(String::new()), FieldValue::trimmed)
    }

    pub fn values(&self) -> &HashMap<String, FieldValue> {
        &self.values
    }

    /// Record an error and mark the form invalid.
    pub fn set_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.insert(field.into(), message.into());
        self.valid = false;
    }

    /// Merge errors in and mark the form invalid.
    pub fn set_errors<I, K, M>(&mut self, errors: I)
    where
        I: IntoIterator<Item = (K, M)>,
        K: Into<String>,
        M: Into<String>,
    {
        self.errors
            .extend(errors.into_iter().map(|(k, m)| (k.into(), m.into())));
        self.valid = false;
    }

    /// Error for a field, or an empty string.
    pub fn error(&self, field: &str) -> &str {
        self.errors.get(field).map_or("", String::as_str)
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn is_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Classified view of the error map.
    pub fn violations(&self) -> Vec<Violation> {
        self.errors.keys().map(|k| Violation::from_key(k)).collect()
    }

    /// Errors as a list, with CSRF and honeypot failures reported form-level.
    pub fn validation_errors(&self) -> Vec<ValidationError> {
        self.errors
            .iter()
            .map(|(key, message)| match Violation::from_key(key) {
                Violation::Field(field) => ValidationError::field(field, message.clone()),
                _ => ValidationError::form(message.clone()),
            })
            .collect()
    }

    /// Whether the form was just completed. Reading clears the flag.
    pub fn is_completed(&self) -> bool {
        take_completed(&self.store, &self.name).unwrap_or_else(|e| {
            warn!(form = %self.name, error = %e, "failed to read completion flag");
            false
        })
    }

    /// Raise the completion flag. `false` leaves any raised flag in place.
    pub fn set_completed(&self, completed: bool) -> StoreResult<()> {
        if completed {
            mark_completed(&self.store, &self.name)?;
        }
        Ok(())
    }

    pub fn set_completed_message(&self, message: impl Into<String>) -> StoreResult<()> {
        set_completed_message(&self.store, &self.name, message.into())
    }

    /// The completion message, or an empty string. Reading clears it.
    pub fn completed_message(&self) -> String {
        match take_completed_message(&self.store, &self.name) {
            Ok(message) => message.unwrap_or_default(),
            Err(e) => {
                warn!(form = %self.name, error = %e, "failed to read completion message");
                String::new()
            }
        }
    }

    /// Issue a fresh CSRF token for this form, replacing the previous one.
    pub fn generate_csrf_token(&self) -> StoreResult<String> {
        let token = generate_csrf_token(&self.store, &self.name, self.config.token_entropy_bytes)?;
        debug!(form = %self.name, "issued CSRF token");
        Ok(token)
    }

    pub fn clear_csrf_token(&self) -> StoreResult<()> {
        clear_csrf_token(&self.store, &self.name)
    }

    /// Name of the hidden input carrying the CSRF token.
    pub fn csrf_field_name(&self) -> String {
        format!("{}{CSRF_FIELD_SUFFIX}", self.name)
    }

    /// Name of the hidden input that must come back empty.
    pub fn honeypot_field_name(&self) -> String {
        format!("{}{HONEYPOT_FIELD_SUFFIX}", self.name)
    }

    /// Issue a token and describe the hidden inputs to render with the form.
    pub fn hidden_fields(&self) -> StoreResult<HiddenFields> {
        Ok(HiddenFields {
            csrf_name: self.csrf_field_name(),
            csrf_token: self.generate_csrf_token()?,
            honeypot_name: self.honeypot_field_name(),
        })
    }
}

/// Last path segment of a type name, without generic arguments.
fn short_type_name<T: ?Sized>() -> &'static str {
    let full = type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::{InMemoryStore, SessionKey};

    struct ContactForm;

    fn form() -> FormValidator<InMemoryStore> {
        FormValidator::new("contact", InMemoryStore::new())
    }

    #[test]
    fn test_name_defaults() {
        let form = FormValidator::new("", InMemoryStore::new());
        assert_eq!(form.name(), "FormValidator");

        let form = FormValidator::named::<ContactForm>(InMemoryStore::new());
        assert_eq!(form.name(), "ContactForm");

        let mut form = FormValidator::new("contact", InMemoryStore::new());
        assert_eq!(form.name(), "contact");
        form.set_name("feedback");
        assert_eq!(form.name(), "feedback");
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name::<ContactForm>(), "ContactForm");
        assert_eq!(
            short_type_name::<FormValidator<InMemoryStore>>(),
            "FormValidator"
        );
    }

    #[test]
    fn test_new_form_state() {
        let form = form();
        assert!(form.validity());
        assert!(!form.has_errors());
        assert!(form.values().is_empty());
        assert!(form.validators().is_empty());
    }

    #[test]
    fn test_value_defaults() {
        let mut form = form();
        form.set_value("name", "  Ada  ");
        form.set_value("tags", vec![" a ".to_string(), "b".to_string()]);
        form.set_value("nothing", FieldValue::Null);

        assert_eq!(form.value("missing"), FieldValue::Text(String::new()));
        assert_eq!(form.value("name"), FieldValue::from("Ada"));
        assert_eq!(
            form.value("tags"),
            FieldValue::List(vec![" a ".to_string(), "b".to_string()])
        );
        assert_eq!(form.value("nothing"), FieldValue::Null);
        // stored value is untouched
        assert_eq!(form.values()["name"], FieldValue::from("  Ada  "));
    }

    #[test]
    fn test_set_values_replaces() {
        let mut form = form();
        form.set_value("old", "x");

        let mut values = HashMap::new();
        values.insert("new".to_string(), FieldValue::from("y"));
        form.set_values(values);

        assert!(!form.values().contains_key("old"));
        assert_eq!(form.value("new"), FieldValue::from("y"));
    }

    #[test]
    fn test_set_error_forces_invalid() {
        let mut form = form();
        form.set_error("email", "Already registered");

        assert!(!form.validity());
        assert!(form.has_errors());
        assert!(form.is_error("email"));
        assert_eq!(form.error("email"), "Already registered");
        assert_eq!(form.error("name"), "");
        assert!(!form.is_error("name"));
    }

    #[test]
    fn test_set_errors_merges() {
        let mut form = form();
        form.set_error("email", "first");
        form.set_errors([("email", "second"), ("name", "Required")]);

        assert!(!form.validity());
        assert_eq!(form.error("email"), "second");
        assert_eq!(form.error("name"), "Required");
        assert_eq!(form.errors().len(), 2);
    }

    #[test]
    fn test_set_errors_empty_still_forces_invalid() {
        let mut form = form();
        form.set_errors(Vec::<(String, String)>::new());
        assert!(!form.validity());
        assert!(!form.has_errors());
    }

    #[test]
    fn test_validation_errors_classifies_keys() {
        let mut form = form();
        form.set_errors([("CsrfToken", "again"), ("email", "bad")]);

        let errors = form.validation_errors();
        assert!(errors.contains(&ValidationError::form("again")));
        assert!(errors.contains(&ValidationError::field("email", "bad")));

        let violations = form.violations();
        assert!(violations.contains(&Violation::CsrfToken));
        assert!(violations.contains(&Violation::Field("email".to_string())));
    }

    #[test]
    fn test_field_names() {
        let form = form();
        assert_eq!(form.csrf_field_name(), "contact_CsrfToken");
        assert_eq!(form.honeypot_field_name(), "contact_Ident");
    }

    #[test]
    fn test_hidden_fields_issue_token() {
        let form = form();
        let hidden = form.hidden_fields().unwrap();

        assert_eq!(hidden.csrf_name, "contact_CsrfToken");
        assert_eq!(hidden.honeypot_name, "contact_Ident");
        assert!(verify_csrf_token(form.store(), "contact", &hidden.csrf_token).unwrap());
    }

    #[test]
    fn test_completion_flag() {
        let form = form();
        assert!(!form.is_completed());

        form.set_completed(true).unwrap();
        assert!(form.is_completed());
        assert!(!form.is_completed());
    }

    #[test]
    fn test_set_completed_false_does_not_clear() {
        let form = form();
        form.set_completed(true).unwrap();
        form.set_completed(false).unwrap();

        assert!(form.is_completed());
    }

    #[test]
    fn test_completed_message() {
        let form = form();
        assert_eq!(form.completed_message(), "");

        form.set_completed_message("Thanks for writing").unwrap();
        assert_eq!(form.completed_message(), "Thanks for writing");
        assert_eq!(form.completed_message(), "");
    }

    struct UnavailableStore;

    impl KeyValueStore for UnavailableStore {
        fn get(&self, _key: &SessionKey) -> StoreResult<Option<String>> {
            Err(StoreError::backend("connection refused"))
        }

        fn set(&self, _key: &SessionKey, _value: String) -> StoreResult<()> {
            Err(StoreError::backend("connection refused"))
        }

        fn consume(&self, _key: &SessionKey) -> StoreResult<Option<String>> {
            Err(StoreError::backend("connection refused"))
        }
    }

    #[test]
    fn test_store_failures_never_validate() {
        let mut form = FormValidator::new("contact", UnavailableStore);
        assert!(form.generate_csrf_token().is_err());
        assert!(form.set_completed(true).is_err());
        // false is a no-op and never touches the store
        assert!(form.set_completed(false).is_ok());

        let mut values = HashMap::new();
        values.insert("contact_CsrfToken".to_string(), FieldValue::from("abc"));
        values.insert("contact_Ident".to_string(), FieldValue::from(""));

        assert!(!form.is_valid(values));
        assert!(form.is_error("CsrfToken"));

        assert!(!form.is_completed());
        assert_eq!(form.completed_message(), "");
    }

    #[test]
    fn test_with_config() {
        let form = form().with_config(FormConfig::default().csrf_message("Expired"));
        assert_eq!(form.config().csrf_message, "Expired");
    }
}
