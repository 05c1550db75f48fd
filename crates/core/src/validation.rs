use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::{FieldErrors, FormField, FormState};

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

pub const EMAIL_REQUIRED: &str = "Email is required";
pub const EMAIL_INVALID: &str = "Please enter a valid email address";
pub const PASSWORD_REQUIRED: &str = "Password is required";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormVariant {
    EmailPassword,
    EmailOnly,
}

impl FormVariant {
    pub fn fields(self) -> &'static [FormField] {
        match self {
            Self::EmailPassword => &[FormField::Email, FormField::Password],
            Self::EmailOnly => &[FormField::Email],
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FormValidator {
    variant: FormVariant,
}

impl FormValidator {
    pub fn new(variant: FormVariant) -> Self {
        Self { variant }
    }

    pub fn variant(&self) -> FormVariant {
        self.variant
    }

    /// Full pass over every field of the variant. An empty map means valid.
    pub fn validate(&self, form: &FormState) -> FieldErrors {
        self.variant
            .fields()
            .iter()
            .filter_map(|field| {
                check_field(*field, form.field(*field)).map(|message| (*field, message.to_string()))
            })
            .collect()
    }

    /// Re-checks one field after an edit, leaving the other errors untouched.
    pub fn revalidate_field(&self, form: &mut FormState, field: FormField) {
        if !self.variant.fields().contains(&field) {
            return;
        }
        match check_field(field, form.field(field)) {
            Some(message) => {
                form.field_errors.insert(field, message.to_string());
            }
            None => {
                form.field_errors.remove(&field);
            }
        }
    }
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

fn check_field(field: FormField, value: &str) -> Option<&'static str> {
    match field {
        FormField::Email if value.trim().is_empty() => Some(EMAIL_REQUIRED),
        FormField::Email if !is_valid_email(value) => Some(EMAIL_INVALID),
        FormField::Password if value.trim().is_empty() => Some(PASSWORD_REQUIRED),
        _ => None,
    }
}
