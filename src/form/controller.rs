use tracing::debug;

use crate::form::{FieldErrors, FormField, FormValues, ValidationSchema};

/// Outcome of asking the form to submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitGate<F: FormField> {
    /// Values passed validation; the form is now submitting.
    Ready(FormValues<F>),
    /// Validation failed on this many fields; nothing was submitted.
    Invalid(usize),
    /// A submission is already in flight.
    Busy,
}

/// Mutable form state bound to a [`ValidationSchema`].
///
/// Fields are validated as a whole on submit. Once a submit has been
/// attempted, each change re-validates the edited field so errors clear
/// as soon as the user fixes them.
#[derive(Debug)]
pub struct FormController<F: FormField> {
    schema: ValidationSchema<F>,
    values: FormValues<F>,
    errors: FieldErrors<F>,
    is_submitting: bool,
    submit_error: Option<String>,
    submit_attempted: bool,
}

impl<F: FormField> FormController<F> {
    pub fn new(schema: ValidationSchema<F>) -> Self {
        Self {
            schema,
            values: FormValues::empty(),
            errors: FieldErrors::new(),
            is_submitting: false,
            submit_error: None,
            submit_attempted: false,
        }
    }

    pub fn value(&self, field: F) -> &str {
        self.values.get(field)
    }

    pub fn error(&self, field: F) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub const fn errors(&self) -> &FieldErrors<F> {
        &self.errors
    }

    pub const fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    /// Error reported by the last failed submission.
    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    /// Apply a user edit. Returns `false` if the form is disabled.
    pub fn set_value(&mut self, field: F, value: impl Into<String>) -> bool {
        if self.is_submitting {
            return false;
        }
        self.values.set(field, value);
        if self.submit_attempted || self.errors.contains_key(&field) {
            self.revalidate(field);
        }
        true
    }

    /// Overwrite values from external data without validating.
    pub fn hydrate(&mut self, values: impl IntoIterator<Item = (F, String)>) {
        for (field, value) in values {
            self.values.set(field, value);
        }
    }

    /// Validate the whole form and, if valid, enter the submitting state.
    pub fn begin_submit(&mut self) -> SubmitGate<F> {
        if self.is_submitting {
            return SubmitGate::Busy;
        }
        self.submit_attempted = true;

        match self.schema.validate(&self.values) {
            Ok(()) => {
                self.errors.clear();
                self.submit_error = None;
                self.is_submitting = true;
                SubmitGate::Ready(self.values.clone())
            }
            Err(errors) => {
                for field in errors.keys() {
                    debug!(field = field.key(), "Form field failed validation");
                }
                let count = errors.len();
                self.errors = errors;
                SubmitGate::Invalid(count)
            }
        }
    }

    /// Leave the submitting state. Values are kept so the user can retry.
    pub fn finish_submit(&mut self, result: Result<(), String>) {
        self.is_submitting = false;
        self.submit_error = result.err();
    }

    /// Back to the initial empty state.
    pub fn reset(&mut self) {
        self.values = FormValues::empty();
        self.errors.clear();
        self.is_submitting = false;
        self.submit_error = None;
        self.submit_attempted = false;
    }

    fn revalidate(&mut self, field: F) {
        match self.schema.validate_field(field, self.values.get(field)) {
            Some(message) => {
                self.errors.insert(field, message.to_string());
            }
            None => {
                self.errors.remove(&field);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{NAME_REQUIRED, ServerField, server_schema};

    fn filled() -> FormController<ServerField> {
        let mut form = FormController::new(server_schema());
        form.hydrate([
            (ServerField::Name, "Old".to_string()),
            (ServerField::ImageUrl, "http://img/old.png".to_string()),
        ]);
        form
    }

    #[test]
    fn test_starts_empty() {
        let form = FormController::new(server_schema());
        assert_eq!(form.value(ServerField::Name), "");
        assert_eq!(form.value(ServerField::ImageUrl), "");
        assert!(!form.is_submitting());
        assert!(form.errors().is_empty());
    }

    #[test]
    fn test_no_validation_before_first_submit() {
        let mut form = filled();
        assert!(form.set_value(ServerField::Name, ""));
        assert!(form.error(ServerField::Name).is_none());
    }

    #[test]
    fn test_invalid_submit_sets_errors_and_stays_idle() {
        let mut form = filled();
        form.set_value(ServerField::Name, "");
        assert_eq!(form.begin_submit(), SubmitGate::Invalid(1));
        assert_eq!(form.error(ServerField::Name), Some(NAME_REQUIRED));
        assert!(!form.is_submitting());
    }

    #[test]
    fn test_change_after_submit_revalidates_field() {
        let mut form = filled();
        form.set_value(ServerField::Name, "");
        form.begin_submit();
        form.set_value(ServerField::Name, "N");
        assert!(form.error(ServerField::Name).is_none());
        form.set_value(ServerField::Name, "");
        assert_eq!(form.error(ServerField::Name), Some(NAME_REQUIRED));
    }

    #[test]
    fn test_inputs_disabled_while_submitting() {
        let mut form = filled();
        let SubmitGate::Ready(values) = form.begin_submit() else {
            panic!("form should be valid");
        };
        assert_eq!(values.get(ServerField::Name), "Old");
        assert!(form.is_submitting());
        assert!(!form.set_value(ServerField::Name, "Other"));
        assert_eq!(form.value(ServerField::Name), "Old");
        assert_eq!(form.begin_submit(), SubmitGate::Busy);
    }

    #[test]
    fn test_failed_submit_keeps_values() {
        let mut form = filled();
        form.set_value(ServerField::Name, "New");
        form.begin_submit();
        form.finish_submit(Err("boom".to_string()));
        assert!(!form.is_submitting());
        assert_eq!(form.value(ServerField::Name), "New");
        assert_eq!(form.submit_error(), Some("boom"));

        // Next successful gate clears the banner.
        assert!(matches!(form.begin_submit(), SubmitGate::Ready(_)));
        assert!(form.submit_error().is_none());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut form = filled();
        form.set_value(ServerField::Name, "");
        form.begin_submit();
        form.reset();
        assert_eq!(form.value(ServerField::Name), "");
        assert_eq!(form.value(ServerField::ImageUrl), "");
        assert!(form.errors().is_empty());
        assert!(form.submit_error().is_none());
        // Back to pre-submit validation mode.
        form.set_value(ServerField::Name, "");
        assert!(form.error(ServerField::Name).is_none());
    }
}
