use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{
        header::{ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN},
        Method, Request, StatusCode,
    },
    Router,
};
use contact_relay::{
    api,
    captcha::SiteVerifyCaptcha,
    mail::{LogMailSender, MailSettings},
    otp::OtpService,
};
use secrecy::SecretString;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn app(allowed_origin: Option<&str>) -> Result<Router> {
    let captcha = SiteVerifyCaptcha::new(
        "http://127.0.0.1:9/siteverify",
        SecretString::from("secret".to_string()),
    )?;
    let service = OtpService::new(
        Arc::new(captcha),
        Arc::new(LogMailSender),
        MailSettings::default(),
    );
    api::router(Arc::new(service), allowed_origin)
}

fn request(method: Method, uri: &str) -> Result<Request<Body>> {
    Ok(Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())?)
}

#[tokio::test]
async fn root_reports_name_and_version() -> Result<()> {
    let response = app(None)?.oneshot(request(Method::GET, "/")?).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    assert_eq!(
        String::from_utf8(bytes.to_vec())?,
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    );
    Ok(())
}

#[tokio::test]
async fn health_get_returns_json() -> Result<()> {
    let response = app(None)?.oneshot(request(Method::GET, "/health")?).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let x_app = response
        .headers()
        .get("X-App")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    assert!(x_app.is_some_and(|value| value.starts_with(env!("CARGO_PKG_NAME"))));

    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let body: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body["name"], env!("CARGO_PKG_NAME"));
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["mail"], "log");
    assert_eq!(body["pending_otps"], 0);
    Ok(())
}

#[tokio::test]
async fn health_options_has_empty_body() -> Result<()> {
    let response = app(None)?
        .oneshot(request(Method::OPTIONS, "/health")?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    assert!(bytes.is_empty());
    Ok(())
}

#[tokio::test]
async fn request_id_is_generated_and_propagated() -> Result<()> {
    let router = app(None)?;

    let response = router.clone().oneshot(request(Method::GET, "/")?).await?;
    let generated = response
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    assert!(generated.is_some_and(|id| ulid::Ulid::from_string(&id).is_ok()));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/")
                .header("x-request-id", "abc-123")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|value| value.to_str().ok()),
        Some("abc-123")
    );
    Ok(())
}

#[tokio::test]
async fn cors_restricts_to_allowed_origin() -> Result<()> {
    let router = app(Some("https://example.com/contact"))?;

    let allowed = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(ORIGIN, "https://example.com")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(
        allowed
            .headers()
            .get(ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|value| value.to_str().ok()),
        Some("https://example.com")
    );

    let denied = router
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(ORIGIN, "https://evil.example")
                .body(Body::empty())?,
        )
        .await?;
    assert!(denied.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    Ok(())
}

#[tokio::test]
async fn empty_captcha_is_rejected_without_provider() -> Result<()> {
    // The verify URL points at a closed port, so only a local rejection can return 400.
    let response = app(None)?
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/send-otp")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"email":"a@x.com","captcha":""}"#))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let body: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body["message"], "Invalid CAPTCHA");
    Ok(())
}

#[test]
fn invalid_allowed_origin_fails() {
    assert!(app(Some("not a url")).is_err());
}
