use super::{MailMessage, MailSender};
use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use secrecy::{ExposeSecret, SecretString};
use std::{fmt, time::Duration};
use tracing::{debug, instrument, warn};

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Authenticated SMTP relay (implicit TLS).
pub struct SmtpMailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
    port: u16,
}

impl SmtpMailSender {
    /// # Errors
    ///
    /// Returns an error if the TLS parameters for `host` cannot be built.
    pub fn new(host: &str, port: u16, username: &str, password: &SecretString) -> Result<Self> {
        let credentials = Credentials::new(
            username.to_string(),
            password.expose_secret().to_string(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .with_context(|| format!("Failed to configure SMTP relay {host}"))?
            .port(port)
            .credentials(credentials)
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        Ok(Self {
            transport,
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Debug for SmtpMailSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpMailSender")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl MailSender for SmtpMailSender {
    #[instrument(skip_all, fields(host = %self.host, port = self.port))]
    async fn send(&self, message: &MailMessage) -> Result<()> {
        let email = build_message(message)?;
        let response = self
            .transport
            .send(email)
            .await
            .with_context(|| format!("SMTP relay {} refused the message", self.host))?;
        debug!(code = %response.code(), "mail accepted by relay");
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "smtp"
    }
}

fn build_message(message: &MailMessage) -> Result<Message> {
    let from: Mailbox = message
        .from
        .parse()
        .with_context(|| format!("Invalid sender address: {}", message.from))?;
    let to: Mailbox = message
        .to
        .parse()
        .with_context(|| format!("Invalid recipient address: {}", message.to))?;

    let mut builder = Message::builder()
        .from(from)
        .to(to)
        .subject(message.subject.clone())
        .header(ContentType::TEXT_HTML);

    if let Some(reply_to) = &message.reply_to {
        match reply_to.parse::<Mailbox>() {
            Ok(mailbox) => builder = builder.reply_to(mailbox),
            Err(err) => warn!("Skipping unparsable reply-to address: {err}"),
        }
    }

    builder
        .body(message.html.clone())
        .context("Failed to build email message")
}
