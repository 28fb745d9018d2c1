//! CAPTCHA token verification.

use crate::APP_USER_AGENT;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

pub const DEFAULT_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

const VERIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Decides whether a client-supplied CAPTCHA token is valid.
///
/// `Ok(false)` means the provider rejected the token. `Err` means the provider
/// could not be asked or gave an unreadable answer.
#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<bool>;
}

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

/// reCAPTCHA-compatible `siteverify` client (Google, hCaptcha and Turnstile
/// all accept the same form post).
#[derive(Debug)]
pub struct SiteVerifyCaptcha {
    client: Client,
    verify_url: Url,
    secret: SecretString,
}

impl SiteVerifyCaptcha {
    /// # Errors
    ///
    /// Returns an error if the URL is not http(s) or the HTTP client cannot be built.
    pub fn new(verify_url: &str, secret: SecretString) -> Result<Self> {
        let verify_url =
            Url::parse(verify_url).with_context(|| format!("Invalid CAPTCHA verify URL: {verify_url}"))?;

        if !matches!(verify_url.scheme(), "http" | "https") {
            return Err(anyhow!(
                "CAPTCHA verify URL must use http or https, got: {}",
                verify_url.scheme()
            ));
        }

        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(VERIFY_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            verify_url,
            secret,
        })
    }
}

#[async_trait]
impl CaptchaVerifier for SiteVerifyCaptcha {
    #[instrument(skip_all, fields(url = %self.verify_url))]
    async fn verify(&self, token: &str) -> Result<bool> {
        let params = [
            ("secret", self.secret.expose_secret()),
            ("response", token),
        ];

        let response = self
            .client
            .post(self.verify_url.as_str())
            .form(&params)
            .send()
            .await
            .context("CAPTCHA verification request failed")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("CAPTCHA verification returned {status}"));
        }

        let body: SiteVerifyResponse = response
            .json()
            .await
            .context("CAPTCHA verification returned an unreadable body")?;

        if !body.success {
            debug!(error_codes = ?body.error_codes, "CAPTCHA rejected");
        }

        Ok(body.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn verifier(server: &MockServer) -> Result<SiteVerifyCaptcha> {
        SiteVerifyCaptcha::new(
            &format!("{}/recaptcha/api/siteverify", server.uri()),
            SecretString::from("site-secret".to_string()),
        )
    }

    #[test]
    fn rejects_non_http_urls() {
        let secret = || SecretString::from("s".to_string());
        assert!(SiteVerifyCaptcha::new("ftp://example.com/verify", secret()).is_err());
        assert!(SiteVerifyCaptcha::new("not a url", secret()).is_err());
        assert!(SiteVerifyCaptcha::new(DEFAULT_VERIFY_URL, secret()).is_ok());
    }

    #[tokio::test]
    async fn accepted_token() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/recaptcha/api/siteverify"))
            .and(body_string_contains("secret=site-secret"))
            .and(body_string_contains("response=good-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .mount(&server)
            .await;

        assert!(verifier(&server)?.verify("good-token").await?);
        Ok(())
    }

    #[tokio::test]
    async fn rejected_token() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/recaptcha/api/siteverify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "error-codes": ["invalid-input-response"]
            })))
            .mount(&server)
            .await;

        assert!(!verifier(&server)?.verify("bad-token").await?);
        Ok(())
    }

    #[tokio::test]
    async fn provider_error_is_not_a_rejection() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        assert!(verifier(&server)?.verify("any").await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn malformed_body_is_an_error() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
            .mount(&server)
            .await;

        assert!(verifier(&server)?.verify("any").await.is_err());
        Ok(())
    }
}
