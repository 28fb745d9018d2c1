//! Outbound email: the code mail sent to visitors and the notification sent to
//! the site operator.
//!
//! Delivery goes through a [`MailSender`]. [`SmtpMailSender`] relays over
//! authenticated SMTP; [`LogMailSender`] only logs the rendered message and is
//! used when no SMTP credentials are configured.

mod smtp;
mod templates;

pub use smtp::SmtpMailSender;
pub use templates::{contact_notification, escape_html, otp_message, single_line};

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

/// Address used as sender and recipient when no mailbox is configured.
pub const LOCAL_ADDRESS: &str = "contact-relay@localhost";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub html: String,
}

/// Mail delivery abstraction shared by both routes.
#[async_trait]
pub trait MailSender: Send + Sync {
    /// Deliver a message or return an error describing why it was not accepted.
    async fn send(&self, message: &MailMessage) -> Result<()>;

    /// Short name reported by `/health`.
    fn kind(&self) -> &'static str;
}

/// Local dev sender that logs the message instead of sending it.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogMailSender;

#[async_trait]
impl MailSender for LogMailSender {
    async fn send(&self, message: &MailMessage) -> Result<()> {
        info!(
            from = %message.from,
            to = %message.to,
            reply_to = ?message.reply_to,
            subject = %message.subject,
            body = %message.html,
            "mail send stub"
        );
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "log"
    }
}

/// Sender identity and operator address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MailSettings {
    from: String,
    notify_to: String,
}

impl MailSettings {
    /// `from_name` is used as the display name of `from_address`.
    #[must_use]
    pub fn new(from_name: &str, from_address: &str, notify_to: &str) -> Self {
        let name = single_line(from_name).replace('"', "");
        let from = if name.is_empty() {
            from_address.to_string()
        } else {
            format!("\"{name}\" <{from_address}>")
        };
        Self {
            from,
            notify_to: notify_to.to_string(),
        }
    }

    #[must_use]
    pub fn from(&self) -> &str {
        &self.from
    }

    #[must_use]
    pub fn notify_to(&self) -> &str {
        &self.notify_to
    }
}

impl Default for MailSettings {
    fn default() -> Self {
        Self::new("Portfolio Contact", LOCAL_ADDRESS, LOCAL_ADDRESS)
    }
}

/// Contact form content relayed to the operator once the code checks out.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_format_display_name() {
        let settings = MailSettings::new("Portfolio Contact", "me@example.com", "ops@example.com");
        assert_eq!(settings.from(), "\"Portfolio Contact\" <me@example.com>");
        assert_eq!(settings.notify_to(), "ops@example.com");
    }

    #[test]
    fn settings_strip_header_breaking_characters() {
        let settings = MailSettings::new("Evil\r\nBcc: x@y.z \"q\"", "me@example.com", "ops@example.com");
        assert!(!settings.from().contains('\n'));
        assert_eq!(settings.from(), "\"Evil Bcc: x@y.z q\" <me@example.com>");
    }

    #[test]
    fn settings_without_name_use_bare_address() {
        let settings = MailSettings::new("  ", "me@example.com", "ops@example.com");
        assert_eq!(settings.from(), "me@example.com");
    }

    #[tokio::test]
    async fn log_sender_accepts_everything() -> Result<()> {
        let sender = LogMailSender;
        let message = otp_message(&MailSettings::default(), "a@x.com", 482_913, 10);
        sender.send(&message).await?;
        assert_eq!(sender.kind(), "log");
        Ok(())
    }
}
