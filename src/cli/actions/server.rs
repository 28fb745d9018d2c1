use crate::{
    api,
    captcha::SiteVerifyCaptcha,
    cli::commands::{captcha, mail, otp},
    mail::{LogMailSender, MailSender, MailSettings, SmtpMailSender},
    otp::OtpService,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub allowed_origin: Option<String>,
    pub mail: mail::Options,
    pub captcha: captcha::Options,
    pub otp: otp::Options,
}

/// Execute the server action.
/// # Errors
/// Returns an error if a collaborator cannot be configured or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let Args {
        port,
        allowed_origin,
        mail,
        captcha,
        otp,
    } = args;

    let settings = MailSettings::new(&mail.from_name, mail.from_address(), mail.notify_address());

    let mailer: Arc<dyn MailSender> = match &mail.credentials {
        Some(credentials) => Arc::new(
            SmtpMailSender::new(
                &mail.smtp_host,
                mail.smtp_port,
                &credentials.username,
                &credentials.password,
            )
            .context("Failed to configure SMTP sender")?,
        ),
        None => {
            warn!("No mail credentials configured, messages will only be logged");
            Arc::new(LogMailSender)
        }
    };

    let verifier = SiteVerifyCaptcha::new(&captcha.verify_url, captcha.secret)
        .context("Failed to configure CAPTCHA verifier")?;

    let service = OtpService::new(Arc::new(verifier), mailer, settings).with_policy(otp.policy());

    info!("OTP policy: {:?}", service.policy());

    api::new(port, Arc::new(service), allowed_origin.as_deref()).await
}

fn log_startup_args(args: &Args) {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        (
            "allowed_origin",
            args.allowed_origin
                .clone()
                .unwrap_or_else(|| "any".to_string()),
        ),
        (
            "mail_mode",
            if args.mail.credentials.is_some() {
                "smtp".to_string()
            } else {
                "log".to_string()
            },
        ),
        (
            "smtp_relay",
            format!("{}:{}", args.mail.smtp_host, args.mail.smtp_port),
        ),
        ("mail_from", args.mail.from_address().to_string()),
        ("notify_to", args.mail.notify_address().to_string()),
        ("captcha_verify_url", args.captcha.verify_url.clone()),
        ("captcha_secret", "REDACTED".to_string()),
        ("otp_ttl_seconds", args.otp.ttl_seconds.to_string()),
        ("otp_max_attempts", args.otp.max_attempts.to_string()),
    ];
    info!("{}", startup_message("Startup configuration", &entries));
}

fn startup_message(title: &str, entries: &[(&str, String)]) -> String {
    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!("{}\n\n{title}:", banner());
    for (key, value) in entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    message
}

fn banner() -> String {
    let short_hash = short_commit(crate::GIT_COMMIT_HASH);
    BANNER.replace(
        "{VERSION}",
        &format!(" - {} - {}", env!("CARGO_PKG_VERSION"), short_hash),
    )
}

fn short_commit(hash: &str) -> String {
    let trimmed = hash.trim();
    if trimmed.len() > 7 {
        trimmed[..7].to_string()
    } else {
        trimmed.to_string()
    }
}

const BANNER: &str = r"
   .------------.
   |\          /|
   | \  ----  / |
   |  '------'  |
   '------------'  C O N T A C T   R E L A Y {VERSION}";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_commit_truncates() {
        assert_eq!(short_commit("0123456789abcdef"), "0123456");
        assert_eq!(short_commit(" abc "), "abc");
    }

    #[test]
    fn startup_message_aligns_keys() {
        let entries = [("a", "1".to_string()), ("long_key", "2".to_string())];
        let message = startup_message("Startup configuration", &entries);
        assert!(message.contains("C O N T A C T"));
        assert!(message.contains("\n  a:        1"));
        assert!(message.contains("\n  long_key: 2"));
    }
}
