use crate::otp::OtpPolicy;
use clap::{Arg, ArgMatches, Command};

pub const ARG_OTP_TTL_SECONDS: &str = "otp-ttl-seconds";
pub const ARG_OTP_MAX_ATTEMPTS: &str = "otp-max-attempts";

#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub ttl_seconds: u64,
    pub max_attempts: u32,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        let defaults = OtpPolicy::new();
        Self {
            ttl_seconds: matches
                .get_one::<u64>(ARG_OTP_TTL_SECONDS)
                .copied()
                .unwrap_or(defaults.ttl().as_secs()),
            max_attempts: matches
                .get_one::<u32>(ARG_OTP_MAX_ATTEMPTS)
                .copied()
                .unwrap_or(defaults.max_attempts()),
        }
    }

    #[must_use]
    pub fn policy(&self) -> OtpPolicy {
        OtpPolicy::new()
            .with_ttl_seconds(self.ttl_seconds)
            .with_max_attempts(self.max_attempts)
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_OTP_TTL_SECONDS)
                .long(ARG_OTP_TTL_SECONDS)
                .help("Seconds a code stays valid")
                .default_value("600")
                .env("CONTACT_RELAY_OTP_TTL_SECONDS")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_OTP_MAX_ATTEMPTS)
                .long(ARG_OTP_MAX_ATTEMPTS)
                .help("Wrong guesses allowed before a code is invalidated")
                .default_value("3")
                .env("CONTACT_RELAY_OTP_MAX_ATTEMPTS")
                .value_parser(clap::value_parser!(u32).range(1..)),
        )
}
