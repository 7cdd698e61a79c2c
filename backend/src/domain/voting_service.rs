//! The voting session protocol: request a passcode, authenticate, cast.
//!
//! Stateless between calls: every operation re-derives the voter's standing
//! from persisted facts, so a crashed or replayed request can never leave a
//! half-authorised session behind.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::ports::{
    AuthenticateRequest, BallotRepository, BallotRepositoryError, CastReceipt, CastRequest,
    DeliveryOutcome, ElectionRepository, ElectionRepositoryError, PasscodeDelivery,
    PasscodeEmailContext, PasscodeRequest, PasscodeService, VoterRepository, VoterRepositoryError,
    VotingSession,
};
use crate::domain::{BallotDraft, EmailAddress, Error, Voter};

/// Message for an unknown registration number on the passcode path.
///
/// The passcode request is the voter's first contact, so it points them at
/// the administrator; the later calls use the terse form.
pub const VOTER_NOT_REGISTERED_MESSAGE: &str =
    "Voter registration not found. Please contact the election administrator.";

/// Message for an unknown registration number on authenticate and cast.
pub const VOTER_NOT_FOUND_MESSAGE: &str = "Voter registration not found";

/// Message when the voter's terminal `Voted` state blocks the operation.
pub const ALREADY_VOTED_MESSAGE: &str = "You have already voted in this election";

/// Message for a registration imported without an email address.
pub const NO_EMAIL_MESSAGE: &str = "No email address associated with your voter registration";

/// Message for a cast with no selections.
pub const NO_VOTES_MESSAGE: &str = "No votes provided";

/// Voting session service over the voter, election, and ballot ports.
///
/// Generic over the repositories, dynamic over the passcode collaborator:
/// the repositories are wired once at startup while the passcode service is
/// shared with the HTTP state, matching how the adapters are owned.
#[derive(Clone)]
pub struct VotingService<V, E, B> {
    voters: Arc<V>,
    elections: Arc<E>,
    ballots: Arc<B>,
    passcodes: Arc<dyn PasscodeService>,
    clock: Arc<dyn Clock>,
}

impl<V, E, B> VotingService<V, E, B> {
    /// Create a new service.
    pub fn new(
        voters: Arc<V>,
        elections: Arc<E>,
        ballots: Arc<B>,
        passcodes: Arc<dyn PasscodeService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            voters,
            elections,
            ballots,
            passcodes,
            clock,
        }
    }
}

fn map_voter_error(error: VoterRepositoryError) -> Error {
    match error {
        VoterRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("voter registry unavailable: {message}"))
        }
        VoterRepositoryError::Query { message } => {
            Error::internal(format!("voter registry error: {message}"))
        }
    }
}

fn map_election_error(error: ElectionRepositoryError) -> Error {
    match error {
        ElectionRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("election store unavailable: {message}"))
        }
        ElectionRepositoryError::Query { message } => {
            Error::internal(format!("election store error: {message}"))
        }
    }
}

fn map_ballot_error(error: BallotRepositoryError) -> Error {
    match error {
        BallotRepositoryError::AlreadyVoted => Error::conflict(ALREADY_VOTED_MESSAGE),
        BallotRepositoryError::DuplicateBallot => {
            Error::conflict("Duplicate ballot for a position")
        }
        BallotRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("ballot store unavailable: {message}"))
        }
        BallotRepositoryError::Query { message } => {
            Error::internal(format!("ballot store error: {message}"))
        }
    }
}

impl<V, E, B> VotingService<V, E, B>
where
    V: VoterRepository,
{
    async fn resolve_voter(
        &self,
        election_id: Uuid,
        registration_number: &str,
        missing_message: &str,
    ) -> Result<Voter, Error> {
        self.voters
            .find_by_registration(election_id, registration_number)
            .await
            .map_err(map_voter_error)?
            .ok_or_else(|| Error::not_found(missing_message))
    }
}

fn require_email(voter: &Voter) -> Result<EmailAddress, Error> {
    voter
        .email
        .clone()
        .ok_or_else(|| Error::invalid_request(NO_EMAIL_MESSAGE))
}

#[async_trait]
impl<V, E, B> VotingSession for VotingService<V, E, B>
where
    V: VoterRepository,
    E: ElectionRepository,
    B: BallotRepository,
{
    async fn request_passcode(
        &self,
        request: PasscodeRequest,
    ) -> Result<PasscodeDelivery, Error> {
        let voter = self
            .resolve_voter(
                request.election_id,
                &request.registration_number,
                VOTER_NOT_REGISTERED_MESSAGE,
            )
            .await?;

        if voter.has_voted() {
            return Err(Error::conflict(ALREADY_VOTED_MESSAGE));
        }

        let email = require_email(&voter)?;

        // The voter row carried this election id, so a missing election row
        // is a referential integrity breach, not a client error.
        let election = self
            .elections
            .find_election(request.election_id)
            .await
            .map_err(map_election_error)?
            .ok_or_else(|| Error::internal("election missing for registered voter"))?;

        let record = self.passcodes.generate(&email).await?;
        let context = PasscodeEmailContext {
            election_title: election.title,
            registration_number: voter.registration_number.clone(),
        };

        match self.passcodes.deliver(&record, &context).await {
            DeliveryOutcome::Sent => Ok(PasscodeDelivery::Emailed {
                email_hint: email.masked(),
            }),
            DeliveryOutcome::Failed { reason } => {
                warn!(
                    election_id = %request.election_id,
                    reason = %reason,
                    "passcode delivery failed, falling back to on-screen code"
                );
                Ok(PasscodeDelivery::Fallback {
                    code: record.code.to_string(),
                })
            }
        }
    }

    async fn authenticate(&self, request: AuthenticateRequest) -> Result<(), Error> {
        let voter = self
            .resolve_voter(
                request.election_id,
                &request.registration_number,
                VOTER_NOT_FOUND_MESSAGE,
            )
            .await?;

        let email = require_email(&voter)?;
        self.passcodes.verify(&email, &request.code).await?;
        info!(election_id = %request.election_id, "voter authenticated");
        Ok(())
    }

    async fn cast(&self, request: CastRequest) -> Result<CastReceipt, Error> {
        let voter = self
            .resolve_voter(
                request.election_id,
                &request.registration_number,
                VOTER_NOT_FOUND_MESSAGE,
            )
            .await?;

        // Early courtesy check; the conditional update inside the cast
        // transaction remains the authoritative guard under concurrency.
        if voter.has_voted() {
            return Err(Error::conflict(ALREADY_VOTED_MESSAGE));
        }

        if request.selections.is_empty() {
            return Err(Error::invalid_request(NO_VOTES_MESSAGE));
        }

        // All selections validate before anything is written; iteration over
        // the ordered map makes the first reported violation deterministic.
        let mut drafts = Vec::with_capacity(request.selections.len());
        for (&position_id, &candidate_id) in &request.selections {
            let candidate = self
                .elections
                .find_approved_candidate(request.election_id, position_id, candidate_id)
                .await
                .map_err(map_election_error)?;
            if candidate.is_none() {
                return Err(Error::invalid_request(format!(
                    "Invalid candidate selection for position {position_id}"
                ))
                .with_details(json!({ "position": position_id })));
            }
            drafts.push(BallotDraft {
                position_id,
                candidate_id,
            });
        }

        let ballots_cast = self
            .ballots
            .record_cast(voter.id, self.clock.utc(), &drafts)
            .await
            .map_err(map_ballot_error)?;

        info!(
            election_id = %request.election_id,
            ballots = ballots_cast,
            "ballots cast"
        );
        Ok(CastReceipt { ballots_cast })
    }
}
