//! Row types bridging Diesel and the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{ballots, candidates, elections, email_otps, positions, voters};

/// Election row as read by the voting core.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = elections)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ElectionRow {
    pub id: Uuid,
    pub title: String,
}

/// Position row as read for tabulation.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = positions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PositionRow {
    pub id: Uuid,
    pub title: String,
}

/// Candidate row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = candidates)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CandidateRow {
    pub id: Uuid,
    pub position_id: Uuid,
    pub full_name: String,
    pub status: String,
}

/// Voter row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = voters)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct VoterRow {
    pub id: Uuid,
    pub election_id: Uuid,
    pub registration_number: String,
    pub email: Option<String>,
    pub status: String,
    pub voted_at: Option<DateTime<Utc>>,
}

/// Insertable passcode row.
#[derive(Debug, Insertable)]
#[diesel(table_name = email_otps)]
pub struct NewOtpRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub code: &'a str,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub state: &'a str,
}

/// Insertable ballot row.
#[derive(Debug, Insertable)]
#[diesel(table_name = ballots)]
pub struct NewBallotRow {
    pub id: Uuid,
    pub voter_id: Uuid,
    pub candidate_id: Uuid,
    pub position_id: Uuid,
    pub cast_at: DateTime<Utc>,
}
