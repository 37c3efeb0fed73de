//! Outbound delivery channels for composed contact emails.
//!
//! A [`DispatchChannel`] takes an assembled [`herald_contact::EmailMessage`]
//! and hands it to an outbound mail channel: an authenticated SMTP relay
//! ([`SmtpChannel`]), the local MTA's sendmail binary
//! ([`SendmailChannel`]), or an in-memory recorder for tests
//! ([`TestChannel`]). Deployment context picks the implementation; callers
//! hold an `Arc<dyn DispatchChannel>` and never learn which one they got.

mod channel;
mod error;
mod message;
mod test_channel;

pub use channel::{DispatchChannel, SendmailChannel, SmtpChannel, SmtpOptions};
pub use error::DispatchError;
pub use test_channel::TestChannel;
