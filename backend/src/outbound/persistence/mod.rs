//! PostgreSQL persistence adapters built on Diesel.

pub mod diesel_ballot_repository;
pub mod diesel_election_repository;
pub mod diesel_otp_repository;
pub mod diesel_voter_repository;
mod error_mapping;
pub mod models;
pub mod pool;
pub mod schema;

pub use diesel_ballot_repository::DieselBallotRepository;
pub use diesel_election_repository::DieselElectionRepository;
pub use diesel_otp_repository::DieselOtpRepository;
pub use diesel_voter_repository::DieselVoterRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
