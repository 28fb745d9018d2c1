//! # Contact Relay (OTP-gated contact form)
//!
//! `contact-relay` backs the contact form of a portfolio website. A visitor
//! first proves control of an email address with a short-lived one-time
//! password, then submits the form; the message is relayed to the site
//! operator by email.
//!
//! ## Flow
//!
//! 1. `POST /api/send-otp` checks the CAPTCHA token, stores a fresh 6-digit code
//!    for the email and mails it to that address.
//! 2. `POST /api/contact` checks the CAPTCHA token again, compares the submitted
//!    code with the stored one and, on success, mails the message to the
//!    operator and consumes the code.
//!
//! ## State
//!
//! Outstanding codes live in a single in-process [`otp::OtpStore`], built once
//! at startup and shared by both routes through [`otp::OtpService`]. Records
//! expire after 10 minutes and are invalidated after 3 wrong guesses.
//!
//! Codes do not survive a restart and are not shared between instances; running
//! more than one replica requires an external TTL cache in place of the store.

pub mod api;
pub mod captcha;
pub mod cli;
pub mod mail;
pub mod otp;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
