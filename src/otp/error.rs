use axum::http::StatusCode;
use thiserror::Error;

/// Failures of the issue/verify flows.
///
/// The first four variants are validation failures caused by the caller; the
/// rest are transport or internal failures whose detail stays server-side.
#[derive(Debug, Error)]
pub enum OtpError {
    #[error("captcha rejected")]
    CaptchaRejected,
    #[error("otp not found")]
    NotFound,
    #[error("otp expired")]
    Expired,
    #[error("otp mismatch")]
    Mismatch,
    #[error("captcha verification unavailable: {0}")]
    CaptchaUnavailable(String),
    #[error("mail transport failed: {0}")]
    MailTransport(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl OtpError {
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::CaptchaRejected | Self::NotFound | Self::Expired | Self::Mismatch
        )
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        if self.is_validation() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    /// Message shown to the client. Transport and internal failures all map to
    /// the route's generic `failure` text.
    #[must_use]
    pub const fn client_message<'a>(&self, failure: &'a str) -> &'a str {
        match self {
            Self::CaptchaRejected => "Invalid CAPTCHA",
            Self::NotFound => "OTP not found. Please request a new OTP.",
            Self::Expired => "OTP has expired. Please request a new OTP.",
            Self::Mismatch => "Invalid OTP. Please try again.",
            Self::CaptchaUnavailable(_) | Self::MailTransport(_) | Self::Internal(_) => failure,
        }
    }
}
