use serde::Deserialize;

use crate::{Mailbox, sanitize};

/// One raw contact-form submission, exactly as received.
///
/// Every field defaults to empty when absent, so a submission missing a
/// required field still deserializes and fails validation with a
/// field-keyed error instead of a parse error.
#[derive(Clone, Debug, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: String,
}

impl ContactRequest {
    /// Sanitizes every field. Everything downstream (validation,
    /// composition) operates on the result; the raw request is never
    /// touched again. A phone that sanitizes to nothing counts as absent.
    #[must_use]
    pub fn sanitize(&self) -> SanitizedFields {
        SanitizedFields {
            name: sanitize::sanitize_text(&self.name),
            email: sanitize::sanitize_email(&self.email),
            phone: self
                .phone
                .as_deref()
                .map(sanitize::sanitize_text)
                .filter(|phone| !phone.is_empty()),
            message: sanitize::sanitize_text(&self.message),
        }
    }
}

/// The sanitized view of a submission, derived once per request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SanitizedFields {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
}

impl SanitizedFields {
    /// The visitor as a mailbox: submitted name as the display name.
    #[must_use]
    pub fn mailbox(&self) -> Mailbox {
        Mailbox::new(Some(self.name.clone()), self.email.clone())
    }
}
