//! Port for the atomic cast transaction.
//!
//! The cast write is the single most safety-critical operation in the
//! system: the `NotVoted -> Voted` flip and every ballot insert must commit
//! together or not at all, and two concurrent casts for the same voter must
//! resolve so exactly one succeeds.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::BallotDraft;

/// Errors raised by ballot repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BallotRepositoryError {
    /// The voter was already in the `Voted` state; nothing was written.
    ///
    /// Raised by the conditional status update when its affected-row count
    /// is zero; this is how the second of two concurrent casts loses.
    #[error("voter has already voted")]
    AlreadyVoted,
    /// A ballot insert violated the (voter, position) uniqueness constraint.
    ///
    /// The database backstop for the one-ballot-per-position invariant; the
    /// whole transaction rolls back.
    #[error("duplicate ballot for voter and position")]
    DuplicateBallot,
    /// Repository connection could not be established.
    #[error("ballot repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("ballot repository query failed: {message}")]
    Query { message: String },
}

impl BallotRepositoryError {
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

/// Port for ballot persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BallotRepository: Send + Sync {
    /// Record all of a voter's ballots and flip their status, atomically.
    ///
    /// One transaction: a conditional `NotVoted -> Voted` update (checked by
    /// affected-row count), then one insert per draft. Any failure rolls the
    /// whole set back; on success the number of ballots written is returned.
    async fn record_cast(
        &self,
        voter_id: Uuid,
        cast_at: DateTime<Utc>,
        ballots: &[BallotDraft],
    ) -> Result<u32, BallotRepositoryError>;
}

/// Fixture implementation that accepts every cast.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBallotRepository;

#[async_trait]
impl BallotRepository for FixtureBallotRepository {
    async fn record_cast(
        &self,
        _voter_id: Uuid,
        _cast_at: DateTime<Utc>,
        ballots: &[BallotDraft],
    ) -> Result<u32, BallotRepositoryError> {
        Ok(u32::try_from(ballots.len()).unwrap_or(u32::MAX))
    }
}
