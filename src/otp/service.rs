use super::{
    Clock, CodeGenerator, OtpError, OtpInput, OtpStore, RandomCode, SystemClock,
    VerificationRecord,
};
use crate::captcha::CaptchaVerifier;
use crate::mail::{contact_notification, otp_message, ContactMessage, MailSender, MailSettings};
use std::{fmt, sync::Arc, time::Duration};
use tracing::{debug, info, instrument};

/// Lifetime and guess limit of an issued code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OtpPolicy {
    ttl: Duration,
    max_attempts: u32,
}

impl OtpPolicy {
    /// Default policy: codes live 10 minutes and allow 3 guesses.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ttl: Duration::from_secs(600),
            max_attempts: 3,
        }
    }

    #[must_use]
    pub fn with_ttl_seconds(mut self, seconds: u64) -> Self {
        self.ttl = Duration::from_secs(seconds);
        self
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Validity window announced in the code email, rounded up to whole minutes.
    #[must_use]
    pub const fn validity_minutes(&self) -> u64 {
        let minutes = self.ttl.as_secs().div_ceil(60);
        if minutes == 0 {
            1
        } else {
            minutes
        }
    }
}

impl Default for OtpPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Issues and verifies codes against the shared [`OtpStore`].
pub struct OtpService {
    store: OtpStore,
    captcha: Arc<dyn CaptchaVerifier>,
    mailer: Arc<dyn MailSender>,
    settings: MailSettings,
    policy: OtpPolicy,
    clock: Arc<dyn Clock>,
    codes: Arc<dyn CodeGenerator>,
}

impl OtpService {
    #[must_use]
    pub fn new(
        captcha: Arc<dyn CaptchaVerifier>,
        mailer: Arc<dyn MailSender>,
        settings: MailSettings,
    ) -> Self {
        Self {
            store: OtpStore::new(),
            captcha,
            mailer,
            settings,
            policy: OtpPolicy::new(),
            clock: Arc::new(SystemClock),
            codes: Arc::new(RandomCode),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: OtpPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_code_generator(mut self, codes: Arc<dyn CodeGenerator>) -> Self {
        self.codes = codes;
        self
    }

    #[must_use]
    pub fn store(&self) -> &OtpStore {
        &self.store
    }

    #[must_use]
    pub fn policy(&self) -> OtpPolicy {
        self.policy
    }

    #[must_use]
    pub fn mailer_kind(&self) -> &'static str {
        self.mailer.kind()
    }

    /// Check the CAPTCHA, store a fresh code for `email` and mail it there.
    ///
    /// Any previous record for the address is replaced, resetting its attempt
    /// counter. If the mail cannot be sent the new record stays in place.
    ///
    /// # Errors
    ///
    /// `CaptchaRejected`, `CaptchaUnavailable` or `MailTransport`.
    #[instrument(skip_all)]
    pub async fn issue(&self, email: &str, captcha: &str) -> Result<(), OtpError> {
        self.check_captcha(captcha).await?;

        let code = self.codes.generate();
        self.store
            .set(email, VerificationRecord::new(code, self.clock.now()))
            .await;
        debug!(email, "otp issued");

        let message = otp_message(
            &self.settings,
            email,
            code,
            self.policy.validity_minutes(),
        );
        self.mailer
            .send(&message)
            .await
            .map_err(|err| OtpError::MailTransport(format!("{err:#}")))?;

        info!("otp mail sent");
        Ok(())
    }

    /// Check the CAPTCHA and the submitted code, then relay `contact` to the
    /// operator and consume the code.
    ///
    /// The per-address lock is held from the lookup until the record is
    /// deleted, so of two concurrent submissions with the right code only one
    /// relays; the other sees `NotFound`. A failed relay keeps the record.
    ///
    /// # Errors
    ///
    /// `CaptchaRejected`, `CaptchaUnavailable`, `NotFound`, `Expired`,
    /// `Mismatch` or `MailTransport`.
    #[instrument(skip_all)]
    pub async fn verify_and_relay(
        &self,
        contact: &ContactMessage,
        otp: Option<&OtpInput>,
        captcha: &str,
    ) -> Result<(), OtpError> {
        self.check_captcha(captcha).await?;

        let mut guard = self.store.lock(&contact.email).await;

        let Some(mut record) = guard.get() else {
            debug!(email = %contact.email, "no pending otp");
            return Err(OtpError::NotFound);
        };

        if record.is_expired(self.clock.now(), self.policy.ttl()) {
            guard.delete();
            debug!(email = %contact.email, "otp expired");
            return Err(OtpError::Expired);
        }

        if !otp.is_some_and(|otp| otp.matches(record.code)) {
            record.attempts = record.attempts.saturating_add(1);
            if record.attempts >= self.policy.max_attempts() {
                guard.delete();
                info!(email = %contact.email, "otp invalidated after too many attempts");
            } else {
                guard.set(record);
            }
            debug!(email = %contact.email, attempts = record.attempts, "otp mismatch");
            return Err(OtpError::Mismatch);
        }

        let message = contact_notification(&self.settings, contact);
        self.mailer
            .send(&message)
            .await
            .map_err(|err| OtpError::MailTransport(format!("{err:#}")))?;

        guard.delete();
        info!("contact message relayed");
        Ok(())
    }

    async fn check_captcha(&self, token: &str) -> Result<(), OtpError> {
        if token.trim().is_empty() {
            return Err(OtpError::CaptchaRejected);
        }

        match self.captcha.verify(token).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(OtpError::CaptchaRejected),
            Err(err) => Err(OtpError::CaptchaUnavailable(format!("{err:#}"))),
        }
    }
}

impl fmt::Debug for OtpService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OtpService")
            .field("settings", &self.settings)
            .field("policy", &self.policy)
            .field("mailer", &self.mailer.kind())
            .finish_non_exhaustive()
    }
}
