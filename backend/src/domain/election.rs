//! Election aggregate: positions, candidates, and ballots.

use uuid::Uuid;

/// An election as seen by the voting core.
///
/// CRUD for elections lives outside this service; the core only reads the
/// title for passcode emails and result payloads.
#[derive(Debug, Clone, PartialEq)]
pub struct Election {
    pub id: Uuid,
    pub title: String,
}

/// Review status of a candidate application.
///
/// Only approved candidates are valid vote targets and appear in tallies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateStatus {
    Pending,
    Approved,
    Rejected,
}

impl CandidateStatus {
    /// Database representation of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl std::str::FromStr for CandidateStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown candidate status: {other}")),
        }
    }
}

/// A candidate competing for one position.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub id: Uuid,
    pub position_id: Uuid,
    pub full_name: String,
    pub status: CandidateStatus,
}

/// One selection within a cast call, prior to persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BallotDraft {
    pub position_id: Uuid,
    pub candidate_id: Uuid,
}

/// Aggregated votes for one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateTally {
    pub candidate_id: Uuid,
    pub full_name: String,
    pub votes: i64,
}

/// Ranked result set for one position.
///
/// Candidates are ordered by vote count descending; ties break by candidate
/// id ascending so repeated tallies are byte-for-byte identical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionTally {
    pub position_id: Uuid,
    pub position_title: String,
    pub candidates: Vec<CandidateTally>,
}
