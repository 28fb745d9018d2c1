//! One-time password issuance and verification.
//!
//! [`OtpService`] owns the only shared mutable state of the service, the
//! [`OtpStore`], together with the collaborators both routes need (CAPTCHA
//! verifier, mail sender, clock and code generator). It is built once at
//! startup and handed to the router behind an `Arc`, so issuance and
//! verification always see the same store.
//!
//! Lifecycle of one email address:
//!
//! ```text
//! NoRecord --issue--> Pending(0) --mismatch--> Pending(1) --mismatch--> Pending(2)
//!                        |                                                  |
//!                        +--match--> NoRecord (relayed)        mismatch --> NoRecord
//!                        +--expiry observed--> NoRecord
//! ```
//!
//! Issuing again from any state resets to a fresh `Pending(0)`.

mod clock;
mod code;
mod error;
mod input;
mod service;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use code::{CodeGenerator, FixedCode, RandomCode, CODE_MAX, CODE_MIN};
pub use error::OtpError;
pub use input::OtpInput;
pub use service::{OtpPolicy, OtpService};
pub use store::{OtpStore, RecordGuard, VerificationRecord};
