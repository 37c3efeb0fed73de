//! Process configuration, read once from the environment at startup.
//!
//! Everything the service needs arrives through environment variables;
//! there is no config file. `.env` loading happens at the binary edge so
//! tests and embedders can seed the environment themselves.

use std::{env, sync::Arc};

use herald_contact::{Mailbox, SenderProfile};
use herald_dispatch::{DispatchChannel, SendmailChannel, SmtpChannel, SmtpOptions};

use crate::error::ConfigError;

/// Port the HTTP listener binds when `PORT` is unset.
const DEFAULT_PORT: u16 = 3001;

/// Submission port used when `SMTP_PORT` is unset.
const DEFAULT_SMTP_PORT: u16 = 587;

/// Which outbound channel dispatch goes through.
#[derive(Clone, Debug)]
pub enum Transport {
    /// A remote SMTP relay, optionally authenticated.
    Smtp(SmtpOptions),
    /// The local MTA's sendmail binary.
    Sendmail,
}

/// Service configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Port the HTTP listener binds on all interfaces.
    pub port: u16,
    pub transport: Transport,
    /// Sender identity stamped on every composed email.
    pub profile: SenderProfile,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `EMAIL_FROM`: mailbox the service sends as, `addr` or `Name <addr>`
    /// - `EMAIL_TO`: agency inbox receiving notifications
    /// - `SMTP_HOST`: relay hostname (unless `MAIL_TRANSPORT=sendmail`)
    ///
    /// Optional:
    /// - `PORT`: HTTP listen port (default: 3001)
    /// - `MAIL_TRANSPORT`: `smtp` (default) or `sendmail`
    /// - `SMTP_PORT`: relay port (default: 587; 465 implies wrapper TLS)
    /// - `SMTP_USER` / `SMTP_PASSWORD`: relay credentials, both or neither
    /// - `EMAIL_REPLY_TO`: reply-to stamped on visitor confirmations
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingVar`] for absent required variables and
    /// [`ConfigError::InvalidValue`] for present but unusable ones.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = parse_port("PORT", DEFAULT_PORT)?;

        let from = required_mailbox("EMAIL_FROM")?;
        let agency = required_mailbox("EMAIL_TO")?;
        let confirmation_reply_to = optional_mailbox("EMAIL_REPLY_TO")?;

        let transport = match env::var("MAIL_TRANSPORT").as_deref() {
            Ok("smtp") | Err(_) => Transport::Smtp(smtp_options()?),
            Ok("sendmail") => Transport::Sendmail,
            Ok(other) => {
                return Err(ConfigError::InvalidValue {
                    var: "MAIL_TRANSPORT".to_owned(),
                    reason: format!("Expected \"smtp\" or \"sendmail\", got: {other}"),
                });
            }
        };

        Ok(Self {
            port,
            transport,
            profile: SenderProfile {
                from,
                agency,
                confirmation_reply_to,
            },
        })
    }

    /// Build the configured dispatch channel.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when the SMTP transport cannot
    /// be constructed for the configured host.
    pub fn channel(&self) -> Result<Arc<dyn DispatchChannel>, ConfigError> {
        match &self.transport {
            Transport::Smtp(options) => {
                let channel =
                    SmtpChannel::new(options).map_err(|error| ConfigError::InvalidValue {
                        var: "SMTP_HOST".to_owned(),
                        reason: error.to_string(),
                    })?;
                Ok(Arc::new(channel))
            }
            Transport::Sendmail => Ok(Arc::new(SendmailChannel::new())),
        }
    }
}

fn smtp_options() -> Result<SmtpOptions, ConfigError> {
    let host =
        env::var("SMTP_HOST").map_err(|_| ConfigError::MissingVar("SMTP_HOST".to_owned()))?;
    if host.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            var: "SMTP_HOST".to_owned(),
            reason: "Cannot be empty".to_owned(),
        });
    }

    let port = parse_port("SMTP_PORT", DEFAULT_SMTP_PORT)?;

    let credentials = match (env::var("SMTP_USER").ok(), env::var("SMTP_PASSWORD").ok()) {
        (Some(user), Some(password)) => Some((user, password)),
        (None, None) => None,
        (Some(_), None) => {
            return Err(ConfigError::InvalidValue {
                var: "SMTP_PASSWORD".to_owned(),
                reason: "SMTP_USER is set without SMTP_PASSWORD".to_owned(),
            });
        }
        (None, Some(_)) => {
            return Err(ConfigError::InvalidValue {
                var: "SMTP_USER".to_owned(),
                reason: "SMTP_PASSWORD is set without SMTP_USER".to_owned(),
            });
        }
    };

    Ok(SmtpOptions {
        host,
        port,
        credentials,
    })
}

fn parse_port(var: &str, default: u16) -> Result<u16, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidValue {
                var: var.to_owned(),
                reason: format!("Must be a port number, got: {value}"),
            }),
        Err(_) => Ok(default),
    }
}

fn required_mailbox(var: &str) -> Result<Mailbox, ConfigError> {
    let value = env::var(var).map_err(|_| ConfigError::MissingVar(var.to_owned()))?;
    value
        .parse()
        .map_err(|error: herald_contact::MailboxError| ConfigError::InvalidValue {
            var: var.to_owned(),
            reason: error.to_string(),
        })
}

fn optional_mailbox(var: &str) -> Result<Option<Mailbox>, ConfigError> {
    match env::var(var) {
        Ok(value) if !value.trim().is_empty() => value
            .parse()
            .map(Some)
            .map_err(|error: herald_contact::MailboxError| ConfigError::InvalidValue {
                var: var.to_owned(),
                reason: error.to_string(),
            }),
        _ => Ok(None),
    }
}
