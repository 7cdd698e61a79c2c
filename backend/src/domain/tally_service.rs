//! Result tabulation over a consistent election snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ports::{
    ElectionRepository, ElectionRepositoryError, ElectionSnapshot, TallyQuery,
};
use crate::domain::{CandidateTally, Error, PositionTally};

/// Tally engine over the election read port.
#[derive(Clone)]
pub struct TallyService<E> {
    elections: Arc<E>,
}

impl<E> TallyService<E> {
    /// Create a new service.
    pub fn new(elections: Arc<E>) -> Self {
        Self { elections }
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

/// Rank a snapshot into per-position results.
///
/// Approved candidates with no ballots appear with a count of zero.
/// Ordering is total: positions by title then id, candidates by votes
/// descending then id, so repeated tallies over the same data are
/// byte-for-byte identical.
fn rank(snapshot: ElectionSnapshot) -> Vec<PositionTally> {
    let counts: HashMap<Uuid, i64> = snapshot
        .ballot_counts
        .iter()
        .map(|count| (count.candidate_id, count.ballots))
        .collect();

    let mut positions = snapshot.positions;
    positions.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));

    positions
        .into_iter()
        .map(|position| {
            let mut candidates: Vec<CandidateTally> = snapshot
                .candidates
                .iter()
                .filter(|candidate| candidate.position_id == position.id)
                .map(|candidate| CandidateTally {
                    candidate_id: candidate.id,
                    full_name: candidate.full_name.clone(),
                    votes: counts.get(&candidate.id).copied().unwrap_or(0),
                })
                .collect();
            candidates.sort_by(|a, b| {
                b.votes
                    .cmp(&a.votes)
                    .then(a.candidate_id.cmp(&b.candidate_id))
            });
            PositionTally {
                position_id: position.id,
                position_title: position.title,
                candidates,
            }
        })
        .collect()
}

#[async_trait]
impl<E> TallyQuery for TallyService<E>
where
    E: ElectionRepository,
{
    async fn tally(&self, election_id: Uuid) -> Result<Vec<PositionTally>, Error> {
        let snapshot = self
            .elections
            .election_snapshot(election_id)
            .await
            .map_err(map_election_error)?;
        Ok(rank(snapshot))
    }
}
