use crate::captcha::DEFAULT_VERIFY_URL;
use anyhow::{bail, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_CAPTCHA_SECRET: &str = "captcha-secret";
pub const ARG_CAPTCHA_VERIFY_URL: &str = "captcha-verify-url";

#[derive(Debug)]
pub struct Options {
    pub secret: SecretString,
    pub verify_url: String,
}

impl Options {
    /// Parse CAPTCHA arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the secret is missing or empty.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let secret = match matches.get_one::<String>(ARG_CAPTCHA_SECRET) {
            Some(value) if !value.trim().is_empty() => SecretString::from(value.clone()),
            _ => bail!("missing required argument: --{ARG_CAPTCHA_SECRET}"),
        };

        let verify_url = matches
            .get_one::<String>(ARG_CAPTCHA_VERIFY_URL)
            .cloned()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_VERIFY_URL.to_string());

        Ok(Self { secret, verify_url })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_CAPTCHA_SECRET)
                .long(ARG_CAPTCHA_SECRET)
                .help("Server-side CAPTCHA secret key")
                .env("CONTACT_RELAY_CAPTCHA_SECRET")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_CAPTCHA_VERIFY_URL)
                .long(ARG_CAPTCHA_VERIFY_URL)
                .help("CAPTCHA siteverify endpoint")
                .long_help(
                    "CAPTCHA siteverify endpoint. Any reCAPTCHA compatible provider works (reCAPTCHA, hCaptcha, Turnstile).",
                )
                .default_value(DEFAULT_VERIFY_URL)
                .env("CONTACT_RELAY_CAPTCHA_VERIFY_URL"),
        )
}
