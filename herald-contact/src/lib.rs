//! Contact submission pipeline: sanitization, validation, and message
//! composition.
//!
//! This crate is the pure core of the contact service. It takes a raw
//! [`ContactRequest`], strips anything unsafe out of it, decides whether it
//! is acceptable, and renders the two outbound emails (the agency
//! notification and the visitor confirmation). Nothing in here performs I/O;
//! delivery is the dispatch crate's concern.
//!
//! The flow for one submission:
//!
//! ```rust
//! use herald_contact::{ContactRequest, Mailbox, SenderProfile, compose, validate};
//!
//! let request = ContactRequest {
//!     name: "Jane Doe".into(),
//!     email: "jane@example.com".into(),
//!     phone: None,
//!     message: "I would like to inquire about your services for an upcoming project.".into(),
//! };
//!
//! let fields = request.sanitize();
//! let result = validate::validate(&fields);
//! assert!(result.is_valid());
//!
//! let profile = SenderProfile {
//!     from: "\"Acme Agency\" <hello@acme.example>".parse::<Mailbox>().unwrap(),
//!     agency: "inbox@acme.example".parse::<Mailbox>().unwrap(),
//!     confirmation_reply_to: None,
//! };
//! let notification = compose::agency_notification(&fields, &profile);
//! let confirmation = compose::visitor_confirmation(&fields, &profile);
//! assert_eq!(notification.subject, "New Contact Request from Jane Doe");
//! assert_eq!(confirmation.to, fields.mailbox());
//! ```

pub mod compose;
mod mailbox;
mod request;
pub mod sanitize;
pub mod validate;

pub use compose::{EmailMessage, SenderProfile};
pub use mailbox::{Mailbox, MailboxError};
pub use request::{ContactRequest, SanitizedFields};
pub use validate::ValidationResult;
