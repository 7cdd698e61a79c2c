//! Voter registry entities.
//!
//! Voters are created by administrative bulk import ahead of the election and
//! never deleted while it runs. The `NotVoted -> Voted` transition is
//! monotonic and performed only inside the cast transaction.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::EmailAddress;

/// Whether a voter has cast their ballots yet.
///
/// Modelled as an explicit two-state machine rather than a bare flag so the
/// guarded conditional update in the persistence layer has a named target
/// state to assert on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoterStatus {
    /// Registered and still eligible to cast.
    NotVoted,
    /// Ballots recorded; terminal.
    Voted,
}

impl VoterStatus {
    /// Database representation of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotVoted => "not_voted",
            Self::Voted => "voted",
        }
    }
}

impl std::str::FromStr for VoterStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_voted" => Ok(Self::NotVoted),
            "voted" => Ok(Self::Voted),
            other => Err(format!("unknown voter status: {other}")),
        }
    }
}

/// A pre-registered voter scoped to one election.
///
/// (election, registration number) is unique; the registration number is how
/// the voter identifies themselves on the wire. The email address is optional
/// at import time, but a voter without one cannot request a passcode.
#[derive(Debug, Clone, PartialEq)]
pub struct Voter {
    pub id: Uuid,
    pub election_id: Uuid,
    pub registration_number: String,
    pub email: Option<EmailAddress>,
    pub status: VoterStatus,
    pub voted_at: Option<DateTime<Utc>>,
}

impl Voter {
    /// Whether the voter has already cast their ballots.
    pub fn has_voted(&self) -> bool {
        self.status == VoterStatus::Voted
    }
}
