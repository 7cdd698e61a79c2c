//! Driving port for the passcode (OTP) service.
//!
//! The voting session protocol depends on this trait rather than on the
//! concrete [`OtpService`] so that session behaviour can be tested with a
//! mocked passcode collaborator.
//!
//! [`OtpService`]: crate::domain::OtpService

use async_trait::async_trait;

use crate::domain::{EmailAddress, Error, OtpRecord};

/// Context rendered into the passcode email body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasscodeEmailContext {
    pub election_title: String,
    pub registration_number: String,
}

/// Definite outcome of a bounded-time delivery attempt.
///
/// There is no pending state: the caller always learns success, failure, or
/// timeout within the configured bound, even though a timed-out transport
/// attempt may still complete in the background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The transport accepted the message within the timeout.
    Sent,
    /// The transport failed or the timeout elapsed; the passcode stays valid.
    Failed { reason: String },
}

/// Port for issuing, delivering, and verifying passcodes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasscodeService: Send + Sync {
    /// Issue a fresh passcode for `email`, superseding any live one.
    async fn generate(&self, email: &EmailAddress) -> Result<OtpRecord, Error>;

    /// Attempt delivery of an issued passcode under the configured timeout.
    async fn deliver(
        &self,
        record: &OtpRecord,
        context: &PasscodeEmailContext,
    ) -> DeliveryOutcome;

    /// Consume a live passcode, exactly once.
    ///
    /// Fails with a generic invalid-code error for never-issued, already
    /// used, and mistyped codes alike, and with an expiry error when the
    /// code matched but its deadline has passed.
    async fn verify(&self, email: &EmailAddress, code: &str) -> Result<(), Error>;
}
