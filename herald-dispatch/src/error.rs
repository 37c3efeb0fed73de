//! Typed error handling for dispatch operations.
//!
//! Delivery failures are ordinary values here, never panics. The taxonomy
//! distinguishes what the operator needs to know from the logs:
//! - could we reach the channel at all ([`DispatchError::Connect`])
//! - did the relay refuse our credentials ([`DispatchError::Auth`])
//! - did the server refuse the message or a recipient
//!   ([`DispatchError::Rejected`])
//! - did the channel itself misbehave locally ([`DispatchError::Channel`])
//!
//! The cause text is preserved for logging and MUST NOT travel to HTTP
//! callers; the handler maps every variant to one generic failure message.

use lettre::transport::smtp::response::{Category, Code, Detail, Severity};
use thiserror::Error;

/// A failed attempt to hand one email to the outbound channel.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The channel could not be reached: refused connection, timeout, TLS
    /// handshake failure.
    #[error("Connection failed: {0}")]
    Connect(String),

    /// The relay rejected the configured credentials.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The server answered the session with a failure code: recipient
    /// refused, policy violation, mailbox unavailable.
    #[error("Delivery rejected: {0}")]
    Rejected(String),

    /// A local channel fault: message assembly, sendmail execution, client
    /// misuse.
    #[error("Channel error: {0}")]
    Channel(String),
}

impl DispatchError {
    /// Returns `true` if the channel was unreachable.
    #[must_use]
    pub const fn is_connect(&self) -> bool {
        matches!(self, Self::Connect(_))
    }

    /// Returns `true` if the relay refused our credentials.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// Returns `true` if the server rejected the message or a recipient.
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    /// Returns `true` for local channel faults.
    #[must_use]
    pub const fn is_channel(&self) -> bool {
        matches!(self, Self::Channel(_))
    }
}

/// Flattens an error and its source chain into one log-friendly line.
fn describe(error: &(dyn std::error::Error + 'static)) -> String {
    let mut line = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        line.push_str(": ");
        line.push_str(&cause.to_string());
        source = cause.source();
    }
    line
}

/// 535: authentication credentials invalid (RFC 4954).
const fn refuses_credentials(code: Code) -> bool {
    matches!(code.severity, Severity::PermanentNegativeCompletion)
        && matches!(code.category, Category::Unspecified3)
        && matches!(code.detail, Detail::Five)
}

/// Categorizes SMTP transport failures.
///
/// - a permanent 535 response is the relay refusing credentials → `Auth`
/// - any other negative response (4xx or 5xx) → `Rejected`
/// - timeouts, TLS and network faults → `Connect`
/// - client-side misuse → `Channel`
impl From<lettre::transport::smtp::Error> for DispatchError {
    fn from(error: lettre::transport::smtp::Error) -> Self {
        let detail = describe(&error);

        if error.status().is_some_and(refuses_credentials) {
            Self::Auth(detail)
        } else if error.is_permanent() || error.is_transient() {
            Self::Rejected(detail)
        } else if error.is_client() {
            Self::Channel(detail)
        } else {
            // Timeout, TLS, connection and network faults all mean the
            // channel was not usable.
            Self::Connect(detail)
        }
    }
}

/// Sendmail failures are execution/I/O faults of the local channel.
impl From<lettre::transport::sendmail::Error> for DispatchError {
    fn from(error: lettre::transport::sendmail::Error) -> Self {
        Self::Channel(describe(&error))
    }
}

/// Message assembly failures (building the MIME structure).
impl From<lettre::error::Error> for DispatchError {
    fn from(error: lettre::error::Error) -> Self {
        Self::Channel(describe(&error))
    }
}

/// Address conversion failures when a composed mailbox cannot be expressed
/// as a transport address.
impl From<lettre::address::AddressError> for DispatchError {
    fn from(error: lettre::address::AddressError) -> Self {
        Self::Channel(describe(&error))
    }
}
