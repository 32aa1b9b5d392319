//! Mail relay transport using lettre

use std::{fmt, time::Duration};

use async_trait::async_trait;
use lettre::{
    Message,
    address::Envelope,
    transport::smtp::{
        authentication::{self, Mechanism},
        client::{SmtpConnection, TlsParameters},
        extension::ClientId,
    },
};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Owner mailbox, used as sender, notification recipient and login
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub password: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            timeout_secs: default_timeout_secs(),
            address: String::new(),
            password: String::new(),
        }
    }
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_owned()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_timeout_secs() -> u64 {
    30
}

impl EmailConfig {
    /// Trimmed owner address, `None` when unset or blank
    pub fn owner_address(&self) -> Option<&str> {
        let address = self.address.trim();

        (!address.is_empty()).then_some(address)
    }

    /// Login credentials, available only when both address and password are set
    pub fn credentials(&self) -> Option<Credentials> {
        let address = self.owner_address()?;
        let password = self.password.trim();

        if password.is_empty() {
            return None;
        }

        Some(Credentials::new(address, password))
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    address: String,
    password: String,
}

impl Credentials {
    pub fn new(address: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            password: password.into(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("address", &self.address)
            .field("password", &"***")
            .finish()
    }
}

impl From<&Credentials> for authentication::Credentials {
    fn from(value: &Credentials) -> Self {
        authentication::Credentials::new(value.address.to_owned(), value.password.to_owned())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("smtp: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("relay protocol: {0}")]
    Protocol(String),

    #[error("relay task: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Outbound mail relay.
///
/// One call to [`Relay::deliver`] is one relay session: every message goes
/// over the same authenticated connection and the whole call fails if any
/// message is refused.
#[async_trait]
pub trait Relay: Send + Sync {
    async fn deliver(
        &self,
        credentials: &Credentials,
        messages: &[Message],
    ) -> Result<(), RelayError>;

    /// Connect, upgrade and log in without sending anything
    async fn verify(&self, credentials: &Credentials) -> Result<(), RelayError>;
}

/// SMTP submission relay: plaintext connect, STARTTLS, EHLO again, AUTH
#[derive(Debug, Clone)]
pub struct SmtpRelay {
    host: String,
    port: u16,
    timeout: Duration,
}

impl SmtpRelay {
    pub fn new(config: &EmailConfig) -> Self {
        tracing::info!(
            smtp_host = %config.smtp_host,
            smtp_port = config.smtp_port,
            timeout_secs = config.timeout_secs,
            "Mail relay configured with STARTTLS"
        );

        Self {
            host: config.smtp_host.to_owned(),
            port: config.smtp_port,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    fn open(&self, credentials: &Credentials) -> Result<SmtpConnection, RelayError> {
        let hello = ClientId::default();
        let mut conn = SmtpConnection::connect(
            (self.host.as_str(), self.port),
            Some(self.timeout),
            &hello,
            None,
            None,
        )?;

        if let Err(err) = self.handshake(&mut conn, &hello, credentials) {
            conn.abort();
            return Err(err);
        }

        Ok(conn)
    }

    fn handshake(
        &self,
        conn: &mut SmtpConnection,
        hello: &ClientId,
        credentials: &Credentials,
    ) -> Result<(), RelayError> {
        if !conn.can_starttls() {
            return Err(RelayError::Protocol(format!(
                "{} does not offer STARTTLS",
                self.host
            )));
        }

        let tls = TlsParameters::builder(self.host.to_owned()).build_rustls()?;
        conn.starttls(&tls, hello)?;
        conn.auth(&[Mechanism::Plain, Mechanism::Login], &credentials.into())?;

        Ok(())
    }

    fn deliver_blocking(
        &self,
        credentials: &Credentials,
        outgoing: &[(Envelope, Vec<u8>)],
    ) -> Result<(), RelayError> {
        let mut conn = self.open(credentials)?;

        for (envelope, body) in outgoing {
            if let Err(err) = conn.send(envelope, body) {
                conn.abort();
                return Err(err.into());
            }
        }

        // Messages are already accepted at this point
        if let Err(err) = conn.quit() {
            tracing::warn!(err = %err, host = %self.host, "QUIT failed after delivery");
            conn.abort();
        }

        Ok(())
    }

    fn verify_blocking(&self, credentials: &Credentials) -> Result<(), RelayError> {
        let mut conn = self.open(credentials)?;

        if let Err(err) = conn.quit() {
            conn.abort();
            return Err(err.into());
        }

        Ok(())
    }
}

#[async_trait]
impl Relay for SmtpRelay {
    async fn deliver(
        &self,
        credentials: &Credentials,
        messages: &[Message],
    ) -> Result<(), RelayError> {
        let outgoing = messages
            .iter()
            .map(|message| (message.envelope().clone(), message.formatted()))
            .collect::<Vec<_>>();

        tracing::info!(
            host = %self.host,
            port = self.port,
            count = outgoing.len(),
            "Opening relay session"
        );

        let relay = self.clone();
        let credentials = credentials.clone();

        tokio::task::spawn_blocking(move || relay.deliver_blocking(&credentials, &outgoing))
            .await?
    }

    async fn verify(&self, credentials: &Credentials) -> Result<(), RelayError> {
        let relay = self.clone();
        let credentials = credentials.clone();

        tokio::task::spawn_blocking(move || relay.verify_blocking(&credentials)).await?
    }
}
