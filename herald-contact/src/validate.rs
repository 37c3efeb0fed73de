//! Field-level acceptance rules.
//!
//! Rules are evaluated independently and every violation is collected, so a
//! submission with a bad name AND a short message reports both at once and
//! the caller can highlight each offending input.

use std::{collections::BTreeMap, sync::LazyLock};

use regex::Regex;
use serde::Serialize;

use crate::SanitizedFields;

/// Minimum message length in characters, counted after sanitization.
///
/// The historical implementations disagreed (20 server-side, 50 in the
/// client); 50 is canonical, applied uniformly.
pub const MESSAGE_MIN_LEN: usize = 50;

static NAME_FORBIDDEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[\d!@#$%^&*(),.?":{}|<>]"#).expect("Failed to compile name pattern")
});

static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Failed to compile email pattern")
});

static PHONE_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\d+\-() ]{7,}$").expect("Failed to compile phone pattern")
});

/// A submission field, in form order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Phone,
    Message,
}

/// The outcome of validating one submission: valid iff no field recorded an
/// error. Serializes as the field-to-message mapping.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationResult {
    errors: BTreeMap<Field, String>,
}

impl ValidationResult {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub const fn errors(&self) -> &BTreeMap<Field, String> {
        &self.errors
    }

    /// The message recorded against one field, if any.
    #[must_use]
    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// The first error in form order, for callers that want a lead message.
    #[must_use]
    pub fn lead(&self) -> Option<&str> {
        self.errors.values().next().map(String::as_str)
    }

    fn record(&mut self, field: Field, message: &str) {
        self.errors.insert(field, message.to_owned());
    }
}

/// Applies every rule to the sanitized fields and collects all violations.
#[must_use]
pub fn validate(fields: &SanitizedFields) -> ValidationResult {
    let mut result = ValidationResult::default();

    if fields.name.is_empty() {
        result.record(Field::Name, "Name is required.");
    } else if NAME_FORBIDDEN.is_match(&fields.name) {
        result.record(Field::Name, "Name must not contain numbers or symbols.");
    }

    if fields.email.is_empty() {
        result.record(Field::Email, "Email is required.");
    } else if !EMAIL_SHAPE.is_match(&fields.email) {
        result.record(Field::Email, "Invalid email address.");
    }

    if let Some(phone) = &fields.phone {
        if !PHONE_SHAPE.is_match(phone) {
            result.record(Field::Phone, "Invalid phone number.");
        }
    }

    if fields.message.is_empty() {
        result.record(Field::Message, "Message is required.");
    } else if fields.message.chars().count() < MESSAGE_MIN_LEN {
        result.record(
            Field::Message,
            "Message is too short. Minimum 50 characters required.",
        );
    }

    result
}
