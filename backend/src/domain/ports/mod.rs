//! Domain ports for the hexagonal boundary.

mod ballot_repository;
mod election_repository;
mod email_delivery;
mod otp_repository;
mod passcode_service;
mod tally_query;
mod voter_repository;
mod voting_session;

#[cfg(test)]
pub use ballot_repository::MockBallotRepository;
pub use ballot_repository::{BallotRepository, BallotRepositoryError, FixtureBallotRepository};
#[cfg(test)]
pub use election_repository::MockElectionRepository;
pub use election_repository::{
    BallotCount, CandidateRecord, ElectionRepository, ElectionRepositoryError, ElectionSnapshot,
    FixtureElectionRepository, PositionRecord,
};
#[cfg(test)]
pub use email_delivery::MockEmailDelivery;
pub use email_delivery::{EmailDelivery, EmailDeliveryError, EmailMessage, FixtureEmailDelivery};
#[cfg(test)]
pub use otp_repository::MockOtpRepository;
pub use otp_repository::{
    FixtureOtpRepository, OtpConsumeOutcome, OtpRepository, OtpRepositoryError,
};
#[cfg(test)]
pub use passcode_service::MockPasscodeService;
pub use passcode_service::{DeliveryOutcome, PasscodeEmailContext, PasscodeService};
#[cfg(test)]
pub use tally_query::MockTallyQuery;
pub use tally_query::{FixtureTallyQuery, TallyQuery};
#[cfg(test)]
pub use voter_repository::MockVoterRepository;
pub use voter_repository::{FixtureVoterRepository, VoterRepository, VoterRepositoryError};
#[cfg(test)]
pub use voting_session::MockVotingSession;
pub use voting_session::{
    AuthenticateRequest, CastReceipt, CastRequest, FixtureVotingSession, PasscodeDelivery,
    PasscodeRequest, VotingSession,
};
