pub mod captcha;
pub mod logging;
pub mod mail;
pub mod otp;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const ARG_PORT: &str = "port";
pub const ARG_ALLOWED_ORIGIN: &str = "allowed-origin";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("contact-relay")
        .about("OTP-gated contact form relay")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long(ARG_PORT)
                .help("Port to listen on")
                .default_value("8080")
                .env("CONTACT_RELAY_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_ALLOWED_ORIGIN)
                .long(ARG_ALLOWED_ORIGIN)
                .help("Origin allowed by CORS, e.g. https://example.com (default: any)")
                .env("CONTACT_RELAY_ALLOWED_ORIGIN"),
        );

    let command = mail::with_args(command);
    let command = captcha::with_args(command);
    let command = otp::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENV_VARS: [&str; 14] = [
        "CONTACT_RELAY_PORT",
        "CONTACT_RELAY_ALLOWED_ORIGIN",
        "CONTACT_RELAY_MAIL_USERNAME",
        "CONTACT_RELAY_MAIL_PASSWORD",
        "CONTACT_RELAY_SMTP_HOST",
        "CONTACT_RELAY_SMTP_PORT",
        "CONTACT_RELAY_MAIL_FROM_NAME",
        "CONTACT_RELAY_NOTIFY_TO",
        "CONTACT_RELAY_CAPTCHA_SECRET",
        "CONTACT_RELAY_CAPTCHA_VERIFY_URL",
        "CONTACT_RELAY_OTP_TTL_SECONDS",
        "CONTACT_RELAY_OTP_MAX_ATTEMPTS",
        "CONTACT_RELAY_LOG_LEVEL",
        "RUST_LOG",
    ];

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "contact-relay");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("OTP-gated contact form relay".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_defaults() {
        temp_env::with_vars_unset(ENV_VARS, || {
            let matches = new().get_matches_from(vec!["contact-relay"]);
            assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(8080));
            assert_eq!(matches.get_one::<String>(ARG_ALLOWED_ORIGIN), None);
            assert_eq!(
                matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                Some(0)
            );
        });
    }

    #[test]
    fn test_check_args() {
        temp_env::with_vars_unset(ENV_VARS, || {
            let matches = new().get_matches_from(vec![
                "contact-relay",
                "--port",
                "3000",
                "--allowed-origin",
                "https://example.com",
                "--captcha-secret",
                "site-secret",
                "-vvv",
            ]);

            assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(3000));
            assert_eq!(
                matches.get_one::<String>(ARG_ALLOWED_ORIGIN).cloned(),
                Some("https://example.com".to_string())
            );
            assert_eq!(
                matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                Some(3)
            );
        });
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("CONTACT_RELAY_PORT", Some("443")),
                ("CONTACT_RELAY_CAPTCHA_SECRET", Some("site-secret")),
                ("CONTACT_RELAY_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().get_matches_from(vec!["contact-relay"]);
                assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(443));
                assert_eq!(
                    matches.get_one::<String>(captcha::ARG_CAPTCHA_SECRET).cloned(),
                    Some("site-secret".to_string())
                );
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("CONTACT_RELAY_LOG_LEVEL", Some(level))], || {
                let matches = new().get_matches_from(vec!["contact-relay"]);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }
}
