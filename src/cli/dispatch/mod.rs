use crate::cli::{
    actions::{server::Args, Action},
    commands::{captcha, mail, otp, ARG_ALLOWED_ORIGIN, ARG_PORT},
};
use anyhow::Result;

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let allowed_origin = matches
        .get_one::<String>(ARG_ALLOWED_ORIGIN)
        .cloned()
        .filter(|v| !v.trim().is_empty());

    Ok(Action::Server(Args {
        port,
        allowed_origin,
        mail: mail::Options::parse(matches)?,
        captcha: captcha::Options::parse(matches)?,
        otp: otp::Options::parse(matches),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;

    #[test]
    fn builds_server_action() -> Result<()> {
        temp_env::with_vars_unset(
            [
                "CONTACT_RELAY_MAIL_USERNAME",
                "CONTACT_RELAY_MAIL_PASSWORD",
                "CONTACT_RELAY_ALLOWED_ORIGIN",
                "CONTACT_RELAY_OTP_TTL_SECONDS",
            ],
            || {
                let matches = commands::new().try_get_matches_from([
                    "contact-relay",
                    "--port",
                    "9000",
                    "--captcha-secret",
                    "site-secret",
                    "--otp-ttl-seconds",
                    "300",
                ])?;

                let Action::Server(args) = handler(&matches)?;
                assert_eq!(args.port, 9000);
                assert_eq!(args.allowed_origin, None);
                assert!(args.mail.credentials.is_none());
                assert_eq!(args.otp.ttl_seconds, 300);
                Ok(())
            },
        )
    }

    #[test]
    fn missing_captcha_secret_fails() {
        temp_env::with_vars_unset(["CONTACT_RELAY_CAPTCHA_SECRET"], || {
            let matches = commands::new().get_matches_from(["contact-relay"]);
            assert!(handler(&matches).is_err());
        });
    }
}
