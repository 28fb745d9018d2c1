use super::{
    error_response, message_response,
    types::{ContactRequest, MessageResponse},
    INVALID_PAYLOAD,
};
use crate::{mail::ContactMessage, otp::OtpService};
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::instrument;

pub const FAILURE: &str = "Failed to send message";

#[utoipa::path(
    post,
    path= "/api/contact",
    request_body = ContactRequest,
    responses (
        (status = 200, description = "Code accepted and message relayed", body = MessageResponse),
        (status = 400, description = "Invalid CAPTCHA, missing, expired or wrong code, or malformed payload", body = MessageResponse),
        (status = 500, description = "CAPTCHA provider or mail relay failed", body = MessageResponse),
    ),
    tag= "contact"
)]
// axum handler for contact
#[instrument(skip_all)]
pub async fn contact(
    service: Extension<Arc<OtpService>>,
    payload: Option<Json<ContactRequest>>,
) -> impl IntoResponse {
    let request: ContactRequest = match payload {
        Some(Json(payload)) => payload,
        None => return message_response(StatusCode::BAD_REQUEST, INVALID_PAYLOAD),
    };

    let ContactRequest {
        name,
        email,
        subject,
        message,
        otp,
        captcha,
    } = request;

    let submission = ContactMessage {
        name,
        email,
        subject,
        message,
    };

    match service
        .verify_and_relay(&submission, otp.as_ref(), &captcha)
        .await
    {
        Ok(()) => message_response(StatusCode::OK, "Message sent successfully"),
        Err(err) => error_response(&err, FAILURE),
    }
}
