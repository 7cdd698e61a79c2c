//! Port for passcode persistence.
//!
//! The store is the synchronisation point for the two passcode races: double
//! issuance and double verification. Adapters must implement [`issue`] as an
//! invalidate-then-insert inside one transaction, and [`consume_live`] as a
//! single conditional `Live -> Used` update checked by affected-row count so
//! exactly one of any pair of concurrent verifications succeeds.
//!
//! [`issue`]: OtpRepository::issue
//! [`consume_live`]: OtpRepository::consume_live

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{EmailAddress, OtpCode, OtpRecord};

/// Errors raised by passcode repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OtpRepositoryError {
    /// Repository connection could not be established.
    #[error("passcode repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("passcode repository query failed: {message}")]
    Query { message: String },
}

impl OtpRepositoryError {
    /// Connection-level failure.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Statement-level failure.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Result of an atomic consume attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpConsumeOutcome {
    /// The live record matched and was marked used by this call.
    Consumed,
    /// A live record matched but its deadline has passed; it was left live.
    Expired,
    /// No live record matches; covers never-issued, already-used, and
    /// mistyped codes indistinguishably.
    NotFound,
}

/// Port for passcode storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OtpRepository: Send + Sync {
    /// Persist a freshly generated record, superseding prior live codes.
    ///
    /// Marks every live record for `record.email` used and inserts `record`,
    /// both inside one transaction, so at most one live code exists per email
    /// at any instant and a concurrent consume can never succeed against a
    /// code mid-supersession.
    async fn issue(&self, record: &OtpRecord) -> Result<(), OtpRepositoryError>;

    /// Atomically consume the live record matching (email, code).
    ///
    /// The `Live -> Used` transition must be a conditional update checked by
    /// affected-row count, never read-then-write. Expired live records are
    /// reported but not consumed.
    async fn consume_live(
        &self,
        email: &EmailAddress,
        code: &OtpCode,
        now: DateTime<Utc>,
    ) -> Result<OtpConsumeOutcome, OtpRepositoryError>;
}

/// Fixture implementation that accepts every issuance and never matches a
/// consume. Use where passcode behaviour is not under test.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureOtpRepository;

#[async_trait]
impl OtpRepository for FixtureOtpRepository {
    async fn issue(&self, _record: &OtpRecord) -> Result<(), OtpRepositoryError> {
        Ok(())
    }

    async fn consume_live(
        &self,
        _email: &EmailAddress,
        _code: &OtpCode,
        _now: DateTime<Utc>,
    ) -> Result<OtpConsumeOutcome, OtpRepositoryError> {
        Ok(OtpConsumeOutcome::NotFound)
    }
}
