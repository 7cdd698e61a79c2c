//! Port for election reads: candidate validation and result aggregation.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Candidate, Election};

/// Errors raised by election repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ElectionRepositoryError {
    /// Repository connection could not be established.
    #[error("election repository connection failed: {message}")]
    Connection { message: String },
    /// Query failed during execution.
    #[error("election repository query failed: {message}")]
    Query { message: String },
}

impl ElectionRepositoryError {
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

/// Raw ballot count for one candidate, prior to ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BallotCount {
    pub candidate_id: Uuid,
    pub ballots: i64,
}

/// Position row as read for tabulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionRecord {
    pub id: Uuid,
    pub title: String,
}

/// Approved candidate row as read for tabulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRecord {
    pub id: Uuid,
    pub position_id: Uuid,
    pub full_name: String,
}

/// Everything the tally engine needs for one election, read in a single
/// consistent snapshot.
///
/// `candidates` contains approved candidates only; `ballot_counts` omits
/// zero-vote candidates (the tally service reinstates them with count 0).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ElectionSnapshot {
    pub positions: Vec<PositionRecord>,
    pub candidates: Vec<CandidateRecord>,
    pub ballot_counts: Vec<BallotCount>,
}

/// Port for election reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ElectionRepository: Send + Sync {
    /// Fetch an election by id.
    async fn find_election(
        &self,
        election_id: Uuid,
    ) -> Result<Option<Election>, ElectionRepositoryError>;

    /// Resolve a candidate only if it is approved, belongs to the given
    /// position, and the position belongs to the given election.
    ///
    /// Returns `None` on any mismatch; callers cannot distinguish which
    /// check failed, which is all the cast validation needs.
    async fn find_approved_candidate(
        &self,
        election_id: Uuid,
        position_id: Uuid,
        candidate_id: Uuid,
    ) -> Result<Option<Candidate>, ElectionRepositoryError>;

    /// Read positions, approved candidates, and ballot counts for an
    /// election inside one transaction.
    ///
    /// The single-transaction read guarantees no concurrently committing
    /// cast is observed half-applied across the snapshot.
    async fn election_snapshot(
        &self,
        election_id: Uuid,
    ) -> Result<ElectionSnapshot, ElectionRepositoryError>;
}

/// Fixture implementation that knows no elections.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureElectionRepository;

#[async_trait]
impl ElectionRepository for FixtureElectionRepository {
    async fn find_election(
        &self,
        _election_id: Uuid,
    ) -> Result<Option<Election>, ElectionRepositoryError> {
        Ok(None)
    }

    async fn find_approved_candidate(
        &self,
        _election_id: Uuid,
        _position_id: Uuid,
        _candidate_id: Uuid,
    ) -> Result<Option<Candidate>, ElectionRepositoryError> {
        Ok(None)
    }

    async fn election_snapshot(
        &self,
        _election_id: Uuid,
    ) -> Result<ElectionSnapshot, ElectionRepositoryError> {
        Ok(ElectionSnapshot::default())
    }
}
