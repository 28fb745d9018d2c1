pub mod contact;
pub mod health;
pub mod root;
pub mod send_otp;
pub mod types;

use self::types::MessageResponse;
use crate::otp::OtpError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::any::Any;
use tracing::{debug, error};

pub const INVALID_PAYLOAD: &str = "Invalid request payload";

// common functions for the handlers

pub(crate) fn message_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(MessageResponse {
            message: message.to_string(),
        }),
    )
        .into_response()
}

/// Map a flow error to its HTTP response. `failure` is the route's generic
/// text for transport and internal errors, whose detail is only logged.
pub(crate) fn error_response(err: &OtpError, failure: &str) -> Response {
    if err.is_validation() {
        debug!("Request rejected: {err}");
    } else {
        error!("{failure}: {err}");
    }

    message_response(err.status(), err.client_message(failure))
}

/// Response for a handler that panicked, logged as an internal failure and
/// answered with the route's generic `failure` text.
pub(crate) fn panic_response(
    failure: &'static str,
) -> impl Fn(Box<dyn Any + Send + 'static>) -> Response + Clone + Send + Sync + 'static {
    move |panic| {
        let detail = if let Some(message) = panic.downcast_ref::<String>() {
            message.clone()
        } else if let Some(message) = panic.downcast_ref::<&str>() {
            (*message).to_string()
        } else {
            "handler panicked".to_string()
        };

        error_response(&OtpError::Internal(detail), failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn panic_maps_to_route_failure() -> anyhow::Result<()> {
        let respond = panic_response("Failed to send OTP");
        let response = respond(Box::new("mailer exploded"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body: MessageResponse = serde_json::from_slice(&bytes)?;
        assert_eq!(body.message, "Failed to send OTP");

        let response = respond(Box::new(42_u8));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        Ok(())
    }
}
