use super::{
    error_response, message_response,
    types::{MessageResponse, SendOtpRequest},
    INVALID_PAYLOAD,
};
use crate::otp::OtpService;
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::instrument;

pub const FAILURE: &str = "Failed to send OTP";

#[utoipa::path(
    post,
    path= "/api/send-otp",
    request_body = SendOtpRequest,
    responses (
        (status = 200, description = "Code generated, stored and mailed", body = MessageResponse),
        (status = 400, description = "Invalid CAPTCHA or malformed payload", body = MessageResponse),
        (status = 500, description = "CAPTCHA provider or mail relay failed", body = MessageResponse),
    ),
    tag= "contact"
)]
// axum handler for send-otp
#[instrument(skip_all)]
pub async fn send_otp(
    service: Extension<Arc<OtpService>>,
    payload: Option<Json<SendOtpRequest>>,
) -> impl IntoResponse {
    let request: SendOtpRequest = match payload {
        Some(Json(payload)) => payload,
        None => return message_response(StatusCode::BAD_REQUEST, INVALID_PAYLOAD),
    };

    match service.issue(&request.email, &request.captcha).await {
        Ok(()) => message_response(StatusCode::OK, "OTP sent successfully"),
        Err(err) => error_response(&err, FAILURE),
    }
}
