use std::collections::BTreeMap;
use std::fmt;

/// A closed set of named form fields.
pub trait FormField: Copy + Ord + fmt::Debug + 'static {
    /// Every field, in display order.
    const ALL: &'static [Self];

    /// Wire/display key of the field.
    fn key(self) -> &'static str;
}

/// Current value of every field in a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValues<F: FormField> {
    values: BTreeMap<F, String>,
}

impl<F: FormField> FormValues<F> {
    /// All fields set to the empty string.
    pub fn empty() -> Self {
        Self {
            values: F::ALL.iter().map(|f| (*f, String::new())).collect(),
        }
    }

    pub fn get(&self, field: F) -> &str {
        self.values.get(&field).map_or("", String::as_str)
    }

    pub fn set(&mut self, field: F, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }
}

impl<F: FormField> Default for FormValues<F> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Constraint applied to a single field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// At least this many characters. Whitespace counts.
    MinLength(usize),
}

impl Rule {
    fn accepts(self, value: &str) -> bool {
        match self {
            Self::MinLength(min) => value.chars().count() >= min,
        }
    }
}

#[derive(Debug, Clone)]
struct FieldRule<F> {
    field: F,
    rule: Rule,
    message: &'static str,
}

/// Validation failures keyed by field.
pub type FieldErrors<F> = BTreeMap<F, String>;

/// Declarative rule set for a form.
///
/// Validation is pure: it only inspects the values handed to it.
#[derive(Debug, Clone)]
pub struct ValidationSchema<F: FormField> {
    rules: Vec<FieldRule<F>>,
}

impl<F: FormField> Default for ValidationSchema<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: FormField> ValidationSchema<F> {
    pub const fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Add a rule for `field`. Rules are checked in insertion order.
    #[must_use]
    pub fn rule(mut self, field: F, rule: Rule, message: &'static str) -> Self {
        self.rules.push(FieldRule {
            field,
            rule,
            message,
        });
        self
    }

    /// Message of the first rule `value` violates for `field`, if any.
    pub fn validate_field(&self, field: F, value: &str) -> Option<&'static str> {
        self.rules
            .iter()
            .filter(|r| r.field == field)
            .find(|r| !r.rule.accepts(value))
            .map(|r| r.message)
    }

    /// Validate every field, collecting one message per failing field.
    pub fn validate(&self, values: &FormValues<F>) -> Result<(), FieldErrors<F>> {
        let errors: FieldErrors<F> = F::ALL
            .iter()
            .filter_map(|field| {
                self.validate_field(*field, values.get(*field))
                    .map(|message| (*field, message.to_string()))
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum Field {
        Title,
        Body,
    }

    impl FormField for Field {
        const ALL: &'static [Self] = &[Self::Title, Self::Body];

        fn key(self) -> &'static str {
            match self {
                Self::Title => "title",
                Self::Body => "body",
            }
        }
    }

    fn schema() -> ValidationSchema<Field> {
        ValidationSchema::new()
            .rule(Field::Title, Rule::MinLength(1), "Title required")
            .rule(Field::Title, Rule::MinLength(3), "Title too short")
            .rule(Field::Body, Rule::MinLength(1), "Body required")
    }

    #[test]
    fn test_first_failing_rule_wins() {
        let schema = schema();
        assert_eq!(schema.validate_field(Field::Title, ""), Some("Title required"));
        assert_eq!(schema.validate_field(Field::Title, "ab"), Some("Title too short"));
        assert_eq!(schema.validate_field(Field::Title, "abc"), None);
    }

    #[test]
    fn test_min_length_counts_chars_not_bytes() {
        let schema = schema();
        assert_eq!(schema.validate_field(Field::Title, "é"), Some("Title too short"));
        assert_eq!(schema.validate_field(Field::Title, "éèê"), None);
    }

    #[test]
    fn test_whitespace_is_not_trimmed() {
        let schema = schema();
        assert_eq!(schema.validate_field(Field::Body, " "), None);
    }

    #[test]
    fn test_validate_collects_all_fields() {
        let schema = schema();
        let errors = schema.validate(&FormValues::empty()).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[&Field::Title], "Title required");
        assert_eq!(errors[&Field::Body], "Body required");

        let mut values = FormValues::empty();
        values.set(Field::Title, "Hello");
        values.set(Field::Body, "World");
        assert!(schema.validate(&values).is_ok());
    }
}
