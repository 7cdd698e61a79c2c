//! Port for voter registry lookups.
//!
//! Voter mutation is deliberately absent from this port: the only write the
//! voting core performs on a voter is the `NotVoted -> Voted` flip, and that
//! belongs to the cast transaction owned by [`BallotRepository`].
//!
//! [`BallotRepository`]: super::BallotRepository

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Voter;

/// Errors raised by voter repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VoterRepositoryError {
    /// Repository connection could not be established.
    #[error("voter repository connection failed: {message}")]
    Connection { message: String },
    /// Query failed during execution.
    #[error("voter repository query failed: {message}")]
    Query { message: String },
}

impl VoterRepositoryError {
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

/// Port for the per-election voter registry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoterRepository: Send + Sync {
    /// Resolve a voter by their public identity within an election.
    ///
    /// Returns `None` when no registration matches; (election,
    /// registration number) is unique so at most one row can match.
    async fn find_by_registration(
        &self,
        election_id: Uuid,
        registration_number: &str,
    ) -> Result<Option<Voter>, VoterRepositoryError>;
}

/// Fixture implementation that knows no voters.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureVoterRepository;

#[async_trait]
impl VoterRepository for FixtureVoterRepository {
    async fn find_by_registration(
        &self,
        _election_id: Uuid,
        _registration_number: &str,
    ) -> Result<Option<Voter>, VoterRepositoryError> {
        Ok(None)
    }
}
