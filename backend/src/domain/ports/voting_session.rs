//! Driving port for the voting session protocol.
//!
//! Three operations, invoked in order per voter, with no cross-request state:
//! every call re-derives authorisation from persisted facts. The calls are
//! correlated only by registration number; `cast` does not demand proof that
//! `authenticate` succeeded for this attempt (a documented protocol gap, see
//! DESIGN notes).

use std::collections::BTreeMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Error;

/// Request to issue and deliver a passcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasscodeRequest {
    pub election_id: Uuid,
    pub registration_number: String,
}

/// How the issued passcode reached (or failed to reach) the voter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasscodeDelivery {
    /// Delivered by email; only the masked address is disclosed.
    Emailed { email_hint: String },
    /// Delivery failed; the raw code is returned for on-screen display.
    ///
    /// Deliberate trade-off: a delivery outage must not lock voters out, so
    /// availability wins over strict passcode confidentiality here.
    Fallback { code: String },
}

/// Request to verify a previously issued passcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticateRequest {
    pub election_id: Uuid,
    pub registration_number: String,
    pub code: String,
}

/// Request to cast ballots for a set of positions.
///
/// Selections map position to candidate; a `BTreeMap` keeps validation order
/// deterministic so the "first violation" error is stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastRequest {
    pub election_id: Uuid,
    pub registration_number: String,
    pub selections: BTreeMap<Uuid, Uuid>,
}

/// Acknowledgement of a committed cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastReceipt {
    pub ballots_cast: u32,
}

/// Port for the authenticate-then-cast voter flow.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VotingSession: Send + Sync {
    /// Issue a passcode for a registered voter and attempt email delivery.
    async fn request_passcode(
        &self,
        request: PasscodeRequest,
    ) -> Result<PasscodeDelivery, Error>;

    /// Verify a passcode for a registered voter.
    async fn authenticate(&self, request: AuthenticateRequest) -> Result<(), Error>;

    /// Validate selections and commit the voter's ballots atomically.
    async fn cast(&self, request: CastRequest) -> Result<CastReceipt, Error>;
}

/// Fixture implementation for handler tests that never finds a voter.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureVotingSession;

#[async_trait]
impl VotingSession for FixtureVotingSession {
    async fn request_passcode(
        &self,
        _request: PasscodeRequest,
    ) -> Result<PasscodeDelivery, Error> {
        Err(Error::not_found("Voter registration not found"))
    }

    async fn authenticate(&self, _request: AuthenticateRequest) -> Result<(), Error> {
        Err(Error::not_found("Voter registration not found"))
    }

    async fn cast(&self, _request: CastRequest) -> Result<CastReceipt, Error> {
        Err(Error::not_found("Voter registration not found"))
    }
}
