//! Driving port for result tabulation.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Error, PositionTally};

/// Port for reading ranked election results.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TallyQuery: Send + Sync {
    /// Produce the ranked result set per position for one election.
    ///
    /// Read-only and safe to run concurrently with ongoing voting; the
    /// underlying snapshot never observes a partially committed cast.
    async fn tally(&self, election_id: Uuid) -> Result<Vec<PositionTally>, Error>;
}

/// Fixture implementation returning an empty result set.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureTallyQuery;

#[async_trait]
impl TallyQuery for FixtureTallyQuery {
    async fn tally(&self, _election_id: Uuid) -> Result<Vec<PositionTally>, Error> {
        Ok(Vec::new())
    }
}
