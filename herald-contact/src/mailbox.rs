use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A display-name/address pair for an email header.
///
/// Owned by the domain so the pipeline never depends on a transport
/// library's types; the dispatch layer converts this into whatever its
/// transport wants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mailbox {
    pub name: Option<String>,
    pub address: String,
}

impl Mailbox {
    #[must_use]
    pub const fn new(name: Option<String>, address: String) -> Self {
        Self { name, address }
    }

    /// The same address under a different display name.
    #[must_use]
    pub fn named(&self, name: &str) -> Self {
        Self {
            name: Some(name.to_owned()),
            address: self.address.clone(),
        }
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "\"{name}\" <{}>", self.address),
            None => f.write_str(&self.address),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MailboxError {
    /// The specification was empty or whitespace.
    #[error("empty mailbox specification")]
    Empty,

    /// An angle-bracketed form carried no address between the brackets.
    #[error("missing address in mailbox specification {0:?}")]
    MissingAddress(String),

    /// The address part has no `@`.
    #[error("address {0:?} is missing an '@'")]
    MissingAt(String),
}

/// Accepts `user@host`, `Name <user@host>`, and `"Name" <user@host>`.
impl FromStr for Mailbox {
    type Err = MailboxError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(MailboxError::Empty);
        }

        let (name, address) = match (spec.rfind('<'), spec.ends_with('>')) {
            (Some(open), true) => {
                let name = spec[..open].trim().trim_matches('"').trim();
                let address = spec[open + 1..spec.len() - 1].trim();
                if address.is_empty() {
                    return Err(MailboxError::MissingAddress(spec.to_owned()));
                }
                let name = (!name.is_empty()).then(|| name.to_owned());
                (name, address.to_owned())
            }
            _ => (None, spec.to_owned()),
        };

        if !address.contains('@') {
            return Err(MailboxError::MissingAt(address));
        }

        Ok(Self { name, address })
    }
}
