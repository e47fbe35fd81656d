//! Declarative validation rules for the workflow forms.
//!
//! A [`Schema`] is a list of fields, each with an ordered list of rules.
//! Validation reports the first failing rule of every failing field, so a
//! form shows at most one message per input.

use crate::types::{LoginInput, ProfileInput, RegisterInput, TodoInput};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Field name to error message, for every field that failed
pub type FieldErrors = BTreeMap<String, String>;

/// Pattern an email address must match
pub const EMAIL_PATTERN: &str = r"^[^@ ]+@[^@ ]+\.[^@ .]{2,}$";

/// Minimum title length (in characters) for add/edit
pub const TITLE_MIN_LEN: usize = 6;

/// Minimum description length (in characters) for add/edit
pub const DESCRIPTION_MIN_LEN: usize = 50;

#[allow(clippy::expect_used)] // Compile-time constant pattern
static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"));

/// A single constraint on a field value, with the message shown when it fails
#[derive(Debug, Clone)]
pub enum Rule {
    /// Value must be non-empty
    Required {
        /// Failure message
        message: String,
    },
    /// Value must have at least `min` characters
    MinLength {
        /// Minimum number of characters
        min: usize,
        /// Failure message
        message: String,
    },
    /// Value must match `regex`
    Pattern {
        /// Pattern to match
        regex: Regex,
        /// Failure message
        message: String,
    },
}

impl Rule {
    /// Value must be non-empty
    #[must_use]
    pub fn required(message: impl Into<String>) -> Self {
        Self::Required {
            message: message.into(),
        }
    }

    /// Value must have at least `min` characters
    #[must_use]
    pub fn min_length(min: usize, message: impl Into<String>) -> Self {
        Self::MinLength {
            min,
            message: message.into(),
        }
    }

    /// Value must match `regex`
    #[must_use]
    pub fn pattern(regex: Regex, message: impl Into<String>) -> Self {
        Self::Pattern {
            regex,
            message: message.into(),
        }
    }

    /// Check `value`, returning the failure message if the rule does not hold
    fn check(&self, value: &str) -> Option<&str> {
        match self {
            Self::Required { message } => value.is_empty().then_some(message.as_str()),
            // Counted in characters, not bytes
            Self::MinLength { min, message } => {
                (value.chars().count() < *min).then_some(message.as_str())
            },
            Self::Pattern { regex, message } => {
                (!regex.is_match(value)).then_some(message.as_str())
            },
        }
    }
}

/// Rules for one named field
#[derive(Debug, Clone)]
pub struct FieldSchema {
    /// Field name, used as the key in [`FieldErrors`]
    pub name: &'static str,
    /// Rules, checked in order
    pub rules: Vec<Rule>,
}

/// Read access to the values of a form
pub trait FormValues {
    /// Current value of `field`, `None` if the form has no such field
    fn value(&self, field: &str) -> Option<&str>;
}

/// A form schema
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<FieldSchema>,
}

impl Schema {
    /// Empty schema
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Add a field with its rules
    #[must_use]
    pub fn field(mut self, name: &'static str, rules: Vec<Rule>) -> Self {
        self.fields.push(FieldSchema { name, rules });
        self
    }

    /// Validate a form against this schema
    ///
    /// A field missing from the form is validated as the empty string.
    ///
    /// # Errors
    ///
    /// Returns the first failing message of every failing field.
    pub fn validate(&self, form: &impl FormValues) -> Result<(), FieldErrors> {
        let errors: FieldErrors = self
            .fields
            .iter()
            .filter_map(|field| {
                let value = form.value(field.name).unwrap_or_default();
                field
                    .rules
                    .iter()
                    .find_map(|rule| rule.check(value))
                    .map(|message| (field.name.to_string(), message.to_string()))
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn todo_schema() -> Schema {
    Schema::new()
        .field(
            "title",
            vec![
                Rule::required("Title is required"),
                Rule::min_length(
                    TITLE_MIN_LEN,
                    format!("The title must be at least {TITLE_MIN_LEN} characters"),
                ),
            ],
        )
        .field(
            "description",
            vec![
                Rule::required("Description is required"),
                Rule::min_length(
                    DESCRIPTION_MIN_LEN,
                    format!("The description must be at least {DESCRIPTION_MIN_LEN} characters"),
                ),
            ],
        )
}

fn email_rules() -> Vec<Rule> {
    vec![
        Rule::required("Email is required"),
        Rule::pattern(EMAIL_REGEX.clone(), "Not a valid email address"),
    ]
}

fn password_rules() -> Vec<Rule> {
    vec![
        Rule::required("Password is required"),
        Rule::min_length(6, "Password should be at least 6 characters"),
    ]
}

static ADD_TODO: LazyLock<Schema> = LazyLock::new(todo_schema);
static EDIT_TODO: LazyLock<Schema> = LazyLock::new(todo_schema);

static PROFILE: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new()
        .field(
            "username",
            vec![
                Rule::required("Username is required"),
                Rule::min_length(6, "The username must be at least 6 characters"),
            ],
        )
        .field("email", email_rules())
});

static LOGIN: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new()
        .field("identifier", email_rules())
        .field("password", password_rules())
});

static REGISTER: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new()
        .field(
            "username",
            vec![
                Rule::required("Username is required"),
                Rule::min_length(5, "Username should be at least 5 characters"),
            ],
        )
        .field("email", email_rules())
        .field("password", password_rules())
});

/// Schema of the "add todo" form
#[must_use]
pub fn add_todo() -> &'static Schema {
    &ADD_TODO
}

/// Schema of the "edit todo" form
#[must_use]
pub fn edit_todo() -> &'static Schema {
    &EDIT_TODO
}

/// Schema of the "edit profile" form
#[must_use]
pub fn profile() -> &'static Schema {
    &PROFILE
}

/// Schema of the login form
#[must_use]
pub fn login() -> &'static Schema {
    &LOGIN
}

/// Schema of the registration form
#[must_use]
pub fn register() -> &'static Schema {
    &REGISTER
}

impl FormValues for TodoInput {
    fn value(&self, field: &str) -> Option<&str> {
        match field {
            "title" => Some(&self.title),
            "description" => Some(&self.description),
            _ => None,
        }
    }
}

impl FormValues for ProfileInput {
    fn value(&self, field: &str) -> Option<&str> {
        match field {
            "username" => Some(&self.username),
            "email" => Some(&self.email),
            _ => None,
        }
    }
}

impl FormValues for LoginInput {
    fn value(&self, field: &str) -> Option<&str> {
        match field {
            "identifier" => Some(&self.identifier),
            "password" => Some(&self.password),
            _ => None,
        }
    }
}

impl FormValues for RegisterInput {
    fn value(&self, field: &str) -> Option<&str> {
        match field {
            "username" => Some(&self.username),
            "email" => Some(&self.email),
            "password" => Some(&self.password),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn todo(title: &str, description: &str) -> TodoInput {
        TodoInput::new(title, description)
    }

    #[test]
    fn accepts_exact_boundaries() {
        let input = todo(&"t".repeat(6), &"d".repeat(50));
        assert!(add_todo().validate(&input).is_ok());
        assert!(edit_todo().validate(&input).is_ok());
    }

    #[test]
    fn rejects_one_below_boundaries() {
        let input = todo(&"t".repeat(5), &"d".repeat(49));
        let errors = add_todo().validate(&input).unwrap_err();

        assert_eq!(errors.len(), 2);
        assert!(errors["title"].contains("at least 6"));
        assert!(errors["description"].contains("at least 50"));
    }

    #[test]
    fn empty_field_reports_required_only() {
        let errors = add_todo().validate(&todo("", &"d".repeat(50))).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["title"], "Title is required");
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // 6 characters, 12 bytes
        let input = todo("éééééé", &"ü".repeat(50));
        assert!(add_todo().validate(&input).is_ok());

        let input = todo("ééééé", &"d".repeat(50));
        assert!(add_todo().validate(&input).is_err());
    }

    #[test]
    fn profile_schema() {
        let ok = ProfileInput {
            username: "alice1".into(),
            email: "alice@example.com".into(),
        };
        assert!(profile().validate(&ok).is_ok());

        let bad = ProfileInput {
            username: "bob".into(),
            email: "bob@example".into(),
        };
        let errors = profile().validate(&bad).unwrap_err();
        assert!(errors["username"].contains("at least 6"));
        assert_eq!(errors["email"], "Not a valid email address");
    }

    #[test]
    fn email_pattern_cases() {
        for valid in ["a@x.com", "first.last@sub.example.org", "x@y.io"] {
            assert!(EMAIL_REGEX.is_match(valid), "{valid} should match");
        }
        for invalid in ["", "a@x", "a@x.c", "a b@x.com", "@x.com", "a@.com", "a@x.c.m"] {
            assert!(!EMAIL_REGEX.is_match(invalid), "{invalid} should not match");
        }
    }

    #[test]
    fn login_and_register_schemas() {
        let login_input = LoginInput {
            identifier: "a@x.com".into(),
            password: "secret".into(),
        };
        assert!(login().validate(&login_input).is_ok());

        let register_input = RegisterInput {
            username: "abcd".into(),
            email: "a@x.com".into(),
            password: "12345".into(),
        };
        let errors = register().validate(&register_input).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.contains_key("username"));
        assert!(errors.contains_key("password"));
    }

    proptest! {
        #[test]
        fn title_valid_iff_at_least_six_chars(title in "\\PC{0,12}") {
            let input = todo(&title, &"d".repeat(50));
            let valid = add_todo().validate(&input).is_ok();
            prop_assert_eq!(valid, title.chars().count() >= TITLE_MIN_LEN);
        }

        #[test]
        fn description_valid_iff_at_least_fifty_chars(len in 0usize..100) {
            let input = todo("A valid title", &"x".repeat(len));
            let valid = edit_todo().validate(&input).is_ok();
            prop_assert_eq!(valid, len >= DESCRIPTION_MIN_LEN);
        }
    }
}
