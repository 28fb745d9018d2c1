use crate::mail::LOCAL_ADDRESS;
use anyhow::{bail, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_MAIL_USERNAME: &str = "mail-username";
pub const ARG_MAIL_PASSWORD: &str = "mail-password";
pub const ARG_SMTP_HOST: &str = "smtp-host";
pub const ARG_SMTP_PORT: &str = "smtp-port";
pub const ARG_MAIL_FROM_NAME: &str = "mail-from-name";
pub const ARG_NOTIFY_TO: &str = "notify-to";

/// SMTP login. Absent when mail should only be logged.
#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

#[derive(Debug)]
pub struct Options {
    pub credentials: Option<Credentials>,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub from_name: String,
    pub notify_to: Option<String>,
}

impl Options {
    /// Parse mail arguments from matches.
    ///
    /// # Errors
    /// Returns an error if only one of username and password is given.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let get_non_empty = |id: &str| {
            matches
                .get_one::<String>(id)
                .cloned()
                .filter(|v| !v.trim().is_empty())
        };

        let credentials = match (
            get_non_empty(ARG_MAIL_USERNAME),
            get_non_empty(ARG_MAIL_PASSWORD),
        ) {
            (Some(username), Some(password)) => Some(Credentials {
                username,
                password: SecretString::from(password),
            }),
            (None, None) => None,
            (Some(_), None) => bail!("--{ARG_MAIL_USERNAME} requires --{ARG_MAIL_PASSWORD}"),
            (None, Some(_)) => bail!("--{ARG_MAIL_PASSWORD} requires --{ARG_MAIL_USERNAME}"),
        };

        Ok(Self {
            credentials,
            smtp_host: get_non_empty(ARG_SMTP_HOST).unwrap_or_else(|| "smtp.gmail.com".to_string()),
            smtp_port: matches.get_one::<u16>(ARG_SMTP_PORT).copied().unwrap_or(465),
            from_name: matches
                .get_one::<String>(ARG_MAIL_FROM_NAME)
                .cloned()
                .unwrap_or_default(),
            notify_to: get_non_empty(ARG_NOTIFY_TO),
        })
    }

    /// Sender address: the SMTP login, or a local placeholder when mail is only logged.
    #[must_use]
    pub fn from_address(&self) -> &str {
        self.credentials
            .as_ref()
            .map_or(LOCAL_ADDRESS, |credentials| credentials.username.as_str())
    }

    /// Operator address, defaulting to the sender address.
    #[must_use]
    pub fn notify_address(&self) -> &str {
        self.notify_to.as_deref().unwrap_or_else(|| self.from_address())
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_MAIL_USERNAME)
                .long(ARG_MAIL_USERNAME)
                .help("SMTP username, also used as the sender address")
                .long_help(
                    "SMTP username, also used as the sender address.\n\nWithout it, mail is written to the log instead of being sent.",
                )
                .env("CONTACT_RELAY_MAIL_USERNAME"),
        )
        .arg(
            Arg::new(ARG_MAIL_PASSWORD)
                .long(ARG_MAIL_PASSWORD)
                .help("SMTP password (app password for Gmail)")
                .env("CONTACT_RELAY_MAIL_PASSWORD")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_SMTP_HOST)
                .long(ARG_SMTP_HOST)
                .help("SMTP relay host (implicit TLS)")
                .default_value("smtp.gmail.com")
                .env("CONTACT_RELAY_SMTP_HOST"),
        )
        .arg(
            Arg::new(ARG_SMTP_PORT)
                .long(ARG_SMTP_PORT)
                .help("SMTP relay port")
                .default_value("465")
                .env("CONTACT_RELAY_SMTP_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_MAIL_FROM_NAME)
                .long(ARG_MAIL_FROM_NAME)
                .help("Display name of the sender")
                .default_value("Portfolio Contact")
                .env("CONTACT_RELAY_MAIL_FROM_NAME"),
        )
        .arg(
            Arg::new(ARG_NOTIFY_TO)
                .long(ARG_NOTIFY_TO)
                .help("Address that receives contact messages (default: the SMTP username)")
                .env("CONTACT_RELAY_NOTIFY_TO"),
        )
}
