//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations exactly; Diesel uses them for
//! compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// Elections under way or archived.
    elections (id) {
        id -> Uuid,
        title -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Contested positions within an election.
    positions (id) {
        id -> Uuid,
        election_id -> Uuid,
        title -> Varchar,
        seat_count -> Int4,
    }
}

diesel::table! {
    /// Candidate applications; only `approved` rows are valid vote targets.
    candidates (id) {
        id -> Uuid,
        position_id -> Uuid,
        full_name -> Varchar,
        status -> Varchar,
    }
}

diesel::table! {
    /// Per-election voter registry.
    voters (id) {
        id -> Uuid,
        election_id -> Uuid,
        registration_number -> Varchar,
        email -> Nullable<Varchar>,
        status -> Varchar,
        voted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Issued passcodes, keyed by email. Rows are never deleted.
    email_otps (id) {
        id -> Uuid,
        email -> Varchar,
        code -> Varchar,
        created_at -> Timestamptz,
        expires_at -> Timestamptz,
        state -> Varchar,
    }
}

diesel::table! {
    /// Recorded ballots; unique per (voter, position).
    ballots (id) {
        id -> Uuid,
        voter_id -> Uuid,
        candidate_id -> Uuid,
        position_id -> Uuid,
        cast_at -> Timestamptz,
    }
}

diesel::joinable!(positions -> elections (election_id));
diesel::joinable!(candidates -> positions (position_id));
diesel::joinable!(voters -> elections (election_id));
diesel::joinable!(ballots -> voters (voter_id));
diesel::joinable!(ballots -> candidates (candidate_id));

diesel::allow_tables_to_appear_in_same_query!(
    elections,
    positions,
    candidates,
    voters,
    email_otps,
    ballots,
);
