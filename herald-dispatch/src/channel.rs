use std::time::Duration;

use async_trait::async_trait;
use herald_contact::EmailMessage;
use lettre::{
    AsyncSendmailTransport, AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
};

use crate::{DispatchError, message};

/// How long one SMTP exchange may take before the send is abandoned.
/// Abandoning only stops the wait; an initiated send is not revoked.
const SMTP_TIMEOUT: Duration = Duration::from_secs(10);

/// An outbound mail channel.
///
/// Implementations hold their connection state for the process lifetime and
/// are shared across requests behind an `Arc<dyn DispatchChannel>`. Ordinary
/// delivery failures come back as [`DispatchError`] values, never panics.
#[async_trait]
pub trait DispatchChannel: Send + Sync {
    /// Hands one assembled email to the channel and waits for the verdict.
    async fn dispatch(&self, email: &EmailMessage) -> Result<(), DispatchError>;

    /// Advisory reachability check, run once at startup. The outcome is
    /// logged; it never gates serving.
    async fn probe(&self) -> Result<(), DispatchError>;

    /// Short label for logs.
    fn name(&self) -> &'static str;
}

/// Connection settings for the SMTP channel, read once at process start.
/// The channel itself holds no default credentials.
#[derive(Clone, Debug)]
pub struct SmtpOptions {
    pub host: String,
    pub port: u16,
    /// `(user, password)` when the deployment relays through an
    /// authenticated submission service.
    pub credentials: Option<(String, String)>,
}

/// Delivery through a remote SMTP relay.
pub struct SmtpChannel {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpChannel {
    /// Builds the pooled transport. Port 465 speaks TLS from the first
    /// byte; every other port starts in plaintext and upgrades via STARTTLS
    /// when the server offers it.
    ///
    /// # Errors
    ///
    /// When the relay host cannot be expressed as a TLS server name.
    pub fn new(options: &SmtpOptions) -> Result<Self, DispatchError> {
        let mut builder = if options.port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&options.host)?
        } else {
            let tls = TlsParameters::new(options.host.clone())?;
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&options.host)
                .tls(Tls::Opportunistic(tls))
        };
        builder = builder.port(options.port).timeout(Some(SMTP_TIMEOUT));

        if let Some((user, password)) = &options.credentials {
            builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl DispatchChannel for SmtpChannel {
    async fn dispatch(&self, email: &EmailMessage) -> Result<(), DispatchError> {
        let message = message::assemble(email)?;
        self.transport.send(message).await?;
        tracing::debug!(to = %email.to.address, subject = %email.subject, "smtp dispatch accepted");
        Ok(())
    }

    async fn probe(&self) -> Result<(), DispatchError> {
        if self.transport.test_connection().await? {
            Ok(())
        } else {
            Err(DispatchError::Connect(
                "relay did not accept the connection probe".to_owned(),
            ))
        }
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}

/// Delivery through the local MTA's sendmail binary.
pub struct SendmailChannel {
    transport: AsyncSendmailTransport<Tokio1Executor>,
}

impl SendmailChannel {
    #[must_use]
    pub fn new() -> Self {
        Self {
            transport: AsyncSendmailTransport::new(),
        }
    }
}

impl Default for SendmailChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DispatchChannel for SendmailChannel {
    async fn dispatch(&self, email: &EmailMessage) -> Result<(), DispatchError> {
        let message = message::assemble(email)?;
        self.transport.send(message).await?;
        tracing::debug!(to = %email.to.address, subject = %email.subject, "sendmail dispatch accepted");
        Ok(())
    }

    /// There is no connection to test; a missing binary surfaces on the
    /// first dispatch instead.
    async fn probe(&self) -> Result<(), DispatchError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "sendmail"
    }
}
