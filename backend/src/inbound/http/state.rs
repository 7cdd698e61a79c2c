//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{TallyQuery, VotingSession};

/// Dependency bundle for HTTP handlers.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use backend::domain::ports::{FixtureTallyQuery, FixtureVotingSession};
/// use backend::inbound::http::state::HttpState;
///
/// let state = HttpState::new(Arc::new(FixtureVotingSession), Arc::new(FixtureTallyQuery));
/// let _voting = state.voting.clone();
/// ```
#[derive(Clone)]
pub struct HttpState {
    pub voting: Arc<dyn VotingSession>,
    pub tally: Arc<dyn TallyQuery>,
}

impl HttpState {
    /// Construct state from the two driving ports.
    pub fn new(voting: Arc<dyn VotingSession>, tally: Arc<dyn TallyQuery>) -> Self {
        Self { voting, tally }
    }
}
