//! Scriptable SMTP relay for exercising the dispatch channel end to end.
#![allow(dead_code)] // Test utility module - not all methods used in every test
//!
//! The relay binds an ephemeral local port, answers each command with a
//! configurable response and records the whole dialogue, so tests can
//! assert on exactly what a transport put on the wire. It never offers
//! `STARTTLS`, which keeps opportunistic-TLS transports in plaintext and
//! the recorded conversation readable.
//!
//! # Example
//!
//! ```rust,no_run
//! use support::mock_server::MockRelay;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let relay = MockRelay::builder()
//!     .reject_recipient("nobody@example.org", 550, "5.1.1 No such user")
//!     .build()
//!     .await?;
//!
//! // Point a transport at relay.port(), dispatch, then inspect
//! // relay.commands().await / relay.messages().await.
//!
//! relay.shutdown();
//! # Ok(())
//! # }
//! ```

use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
    sync::RwLock,
    task::JoinHandle,
    time::{error::Elapsed, sleep, timeout},
};

/// How long the accept loop waits before re-checking the shutdown flag.
const ACCEPT_POLL: Duration = Duration::from_millis(100);

/// Per-read client timeout. A client that stalls longer than this is
/// dropped rather than holding the session task forever.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Every client action the relay records, in arrival order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelayCommand {
    Ehlo(String),
    Auth(String),
    MailFrom(String),
    RcptTo(String),
    Data,
    /// The payload transmitted between `DATA` and the closing dot, with
    /// dot transparency reversed.
    Message(String),
    Rset,
    Noop,
    Quit,
    Other(String),
}

/// A single scripted SMTP reply.
#[derive(Clone, Debug)]
pub struct RelayResponse {
    code: u16,
    text: String,
}

impl RelayResponse {
    #[must_use]
    pub fn new(code: u16, text: &str) -> Self {
        Self {
            code,
            text: text.to_owned(),
        }
    }

    fn line(&self) -> String {
        format!("{} {}\r\n", self.code, self.text)
    }
}

/// The responses a relay session plays back, one per command verb.
#[derive(Clone, Debug)]
struct RelayScript {
    hostname: String,
    greeting: RelayResponse,
    /// When set, `AUTH` is advertised in the `EHLO` response and answered
    /// with this reply.
    auth: Option<RelayResponse>,
    mail_from: RelayResponse,
    rcpt_to: RelayResponse,
    /// Per-address overrides checked before the default `RCPT TO` reply.
    recipient_overrides: Vec<(String, RelayResponse)>,
    data: RelayResponse,
    data_end: RelayResponse,
    /// Hang up as soon as a client connects, before any greeting.
    close_on_connect: bool,
}

impl Default for RelayScript {
    fn default() -> Self {
        Self {
            hostname: "mock.relay.test".to_owned(),
            greeting: RelayResponse::new(220, "mock.relay.test ESMTP ready"),
            auth: None,
            mail_from: RelayResponse::new(250, "Ok"),
            rcpt_to: RelayResponse::new(250, "Ok"),
            recipient_overrides: Vec::new(),
            data: RelayResponse::new(354, "End data with <CR><LF>.<CR><LF>"),
            data_end: RelayResponse::new(250, "Ok: queued"),
            close_on_connect: false,
        }
    }
}

impl RelayScript {
    /// Multi-line `EHLO` response. Intermediate capability lines carry a
    /// `250-` prefix, the last one `250` and a space.
    fn ehlo_response(&self) -> String {
        let mut capabilities = vec![self.hostname.clone()];
        if self.auth.is_some() {
            capabilities.push("AUTH PLAIN LOGIN".to_owned());
        }
        capabilities.push("8BITMIME".to_owned());

        let last = capabilities.len() - 1;
        capabilities
            .iter()
            .enumerate()
            .map(|(index, capability)| {
                if index == last {
                    format!("250 {capability}\r\n")
                } else {
                    format!("250-{capability}\r\n")
                }
            })
            .collect()
    }

    fn rcpt_response(&self, args: &str) -> &RelayResponse {
        self.recipient_overrides
            .iter()
            .find(|(address, _)| args.contains(address.as_str()))
            .map_or(&self.rcpt_to, |(_, response)| response)
    }
}

/// Builder for [`MockRelay`] with scripted responses.
#[derive(Clone, Debug, Default)]
pub struct MockRelayBuilder {
    script: RelayScript,
}

impl MockRelayBuilder {
    /// Override the connection greeting.
    #[must_use]
    pub fn with_greeting(mut self, code: u16, text: &str) -> Self {
        self.script.greeting = RelayResponse::new(code, text);
        self
    }

    /// Advertise `AUTH PLAIN LOGIN` and answer `AUTH` with this reply.
    #[must_use]
    pub fn with_auth(mut self, code: u16, text: &str) -> Self {
        self.script.auth = Some(RelayResponse::new(code, text));
        self
    }

    /// Override the `MAIL FROM` reply.
    #[must_use]
    pub fn with_mail_from_response(mut self, code: u16, text: &str) -> Self {
        self.script.mail_from = RelayResponse::new(code, text);
        self
    }

    /// Override the default `RCPT TO` reply.
    #[must_use]
    pub fn with_rcpt_response(mut self, code: u16, text: &str) -> Self {
        self.script.rcpt_to = RelayResponse::new(code, text);
        self
    }

    /// Answer `RCPT TO` for this address with the given reply while other
    /// recipients keep the default. Matches on substring, so a bare
    /// address works against `TO:<address>` argument forms.
    #[must_use]
    pub fn reject_recipient(mut self, address: &str, code: u16, text: &str) -> Self {
        self.script
            .recipient_overrides
            .push((address.to_owned(), RelayResponse::new(code, text)));
        self
    }

    /// Override the reply sent after the end-of-data dot.
    #[must_use]
    pub fn with_data_end_response(mut self, code: u16, text: &str) -> Self {
        self.script.data_end = RelayResponse::new(code, text);
        self
    }

    /// Accept connections and immediately hang up without a greeting.
    #[must_use]
    pub fn close_on_connect(mut self) -> Self {
        self.script.close_on_connect = true;
        self
    }

    /// Bind `127.0.0.1:0` and start serving the script.
    ///
    /// # Errors
    ///
    /// When the listener cannot be bound.
    pub async fn build(self) -> std::io::Result<MockRelay> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let commands = Arc::new(RwLock::new(Vec::new()));
        let shutdown = Arc::new(AtomicBool::new(false));
        let script = Arc::new(self.script);

        let handle = tokio::spawn(serve(
            listener,
            script,
            Arc::clone(&commands),
            Arc::clone(&shutdown),
        ));

        Ok(MockRelay {
            addr,
            commands,
            shutdown,
            handle,
        })
    }
}

/// A running scripted relay bound to an ephemeral local port.
#[derive(Debug)]
pub struct MockRelay {
    addr: SocketAddr,
    commands: Arc<RwLock<Vec<RelayCommand>>>,
    shutdown: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl MockRelay {
    #[must_use]
    pub fn builder() -> MockRelayBuilder {
        MockRelayBuilder::default()
    }

    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Everything clients have sent so far, in arrival order.
    pub async fn commands(&self) -> Vec<RelayCommand> {
        self.commands.read().await.clone()
    }

    /// The message payloads received so far, in arrival order.
    pub async fn messages(&self) -> Vec<String> {
        self.commands
            .read()
            .await
            .iter()
            .filter_map(|command| match command {
                RelayCommand::Message(content) => Some(content.clone()),
                _ => None,
            })
            .collect()
    }

    /// Polls until `count` message payloads have arrived.
    ///
    /// # Errors
    ///
    /// When fewer than `count` messages arrive within `wait`.
    pub async fn wait_for_messages(
        &self,
        count: usize,
        wait: Duration,
    ) -> Result<Vec<String>, Elapsed> {
        timeout(wait, async {
            loop {
                let messages = self.messages().await;
                if messages.len() >= count {
                    return messages;
                }
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await
    }

    /// Stop accepting connections and tear the accept loop down.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        self.handle.abort();
    }
}

async fn serve(
    listener: TcpListener,
    script: Arc<RelayScript>,
    commands: Arc<RwLock<Vec<RelayCommand>>>,
    shutdown: Arc<AtomicBool>,
) {
    while !shutdown.load(Ordering::Relaxed) {
        match timeout(ACCEPT_POLL, listener.accept()).await {
            Ok(Ok((stream, _))) => {
                let script = Arc::clone(&script);
                let commands = Arc::clone(&commands);
                tokio::spawn(async move {
                    let _ = handle_client(stream, &script, &commands).await;
                });
            }
            Ok(Err(_)) => break,
            // Accept window elapsed without a client; re-check the flag.
            Err(_) => {}
        }
    }
}

async fn handle_client(
    stream: TcpStream,
    script: &RelayScript,
    commands: &RwLock<Vec<RelayCommand>>,
) -> std::io::Result<()> {
    if script.close_on_connect {
        return Ok(());
    }

    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    write_half
        .write_all(script.greeting.line().as_bytes())
        .await?;

    let mut line = String::new();
    loop {
        line.clear();
        let Ok(Ok(bytes)) = timeout(CLIENT_TIMEOUT, reader.read_line(&mut line)).await else {
            return Ok(());
        };
        if bytes == 0 {
            // Client hung up.
            return Ok(());
        }

        let trimmed = line.trim_end();
        let (verb, args) = trimmed.split_once(' ').unwrap_or((trimmed, ""));

        match verb.to_ascii_uppercase().as_str() {
            "EHLO" | "HELO" => {
                commands
                    .write()
                    .await
                    .push(RelayCommand::Ehlo(args.to_owned()));
                write_half
                    .write_all(script.ehlo_response().as_bytes())
                    .await?;
            }
            "AUTH" => {
                commands
                    .write()
                    .await
                    .push(RelayCommand::Auth(args.to_owned()));
                let response = script
                    .auth
                    .clone()
                    .unwrap_or_else(|| RelayResponse::new(502, "Command not implemented"));
                write_half.write_all(response.line().as_bytes()).await?;
            }
            "MAIL" => {
                commands
                    .write()
                    .await
                    .push(RelayCommand::MailFrom(args.to_owned()));
                write_half
                    .write_all(script.mail_from.line().as_bytes())
                    .await?;
            }
            "RCPT" => {
                let response = script.rcpt_response(args).clone();
                commands
                    .write()
                    .await
                    .push(RelayCommand::RcptTo(args.to_owned()));
                write_half.write_all(response.line().as_bytes()).await?;
            }
            "DATA" => {
                commands.write().await.push(RelayCommand::Data);
                write_half.write_all(script.data.line().as_bytes()).await?;
                let message = read_message(&mut reader).await?;
                commands.write().await.push(RelayCommand::Message(message));
                write_half
                    .write_all(script.data_end.line().as_bytes())
                    .await?;
            }
            "RSET" => {
                commands.write().await.push(RelayCommand::Rset);
                write_half.write_all(b"250 Ok\r\n").await?;
            }
            "NOOP" => {
                commands.write().await.push(RelayCommand::Noop);
                write_half.write_all(b"250 Ok\r\n").await?;
            }
            "QUIT" => {
                commands.write().await.push(RelayCommand::Quit);
                write_half.write_all(b"221 Bye\r\n").await?;
                return Ok(());
            }
            _ => {
                commands
                    .write()
                    .await
                    .push(RelayCommand::Other(trimmed.to_owned()));
                write_half.write_all(b"250 Ok\r\n").await?;
            }
        }
    }
}

/// Reads the payload after `DATA` up to the lone-dot terminator, undoing
/// the dot stuffing the client applied.
async fn read_message<R>(reader: &mut R) -> std::io::Result<String>
where
    R: AsyncBufReadExt + Unpin,
{
    let mut message = String::new();
    let mut line = String::new();
    loop {
        line.clear();
        let bytes = timeout(CLIENT_TIMEOUT, reader.read_line(&mut line))
            .await
            .map_err(|_| std::io::Error::other("timed out reading message data"))??;
        if bytes == 0 || line.trim_end() == "." {
            return Ok(message);
        }

        let unstuffed = line.strip_prefix('.').unwrap_or(&line);
        message.push_str(unstuffed);
    }
}
