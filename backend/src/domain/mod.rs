//! Domain layer: entities, value objects, ports, and services.
//!
//! Everything here is transport and storage agnostic. Inbound adapters call
//! the driving ports ([`ports::VotingSession`], [`ports::TallyQuery`]);
//! outbound adapters implement the driven ports.

mod election;
mod email;
mod error;
mod otp;
mod otp_service;
pub mod ports;
mod tally_service;
mod voter;
mod voting_service;

pub use election::{
    BallotDraft, Candidate, CandidateStatus, CandidateTally, Election, PositionTally,
};
pub use email::{EmailAddress, EmailAddressError};
pub use error::{Error, ErrorCode};
pub use otp::{OtpCode, OtpCodeError, OtpRecord, OtpState, DEFAULT_CODE_LENGTH};
pub use otp_service::{
    OtpConfig, OtpService, EXPIRED_CODE_MESSAGE, INVALID_CODE_MESSAGE,
};
pub use tally_service::TallyService;
pub use voter::{Voter, VoterStatus};
pub use voting_service::{
    VotingService, ALREADY_VOTED_MESSAGE, NO_EMAIL_MESSAGE, NO_VOTES_MESSAGE,
    VOTER_NOT_FOUND_MESSAGE, VOTER_NOT_REGISTERED_MESSAGE,
};
