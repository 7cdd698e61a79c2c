//! PostgreSQL-backed election read adapter.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{
    BallotCount, CandidateRecord, ElectionRepository, ElectionRepositoryError, ElectionSnapshot,
    PositionRecord,
};
use crate::domain::{Candidate, CandidateStatus, Election};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{CandidateRow, ElectionRow, PositionRow};
use super::pool::{DbPool, PoolError};
use super::schema::{ballots, candidates, positions};

/// Diesel-backed implementation of the election read port.
#[derive(Clone)]
pub struct DieselElectionRepository {
    pool: DbPool,
}

impl DieselElectionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> ElectionRepositoryError {
    map_pool_error(error, ElectionRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> ElectionRepositoryError {
    map_diesel_error(
        error,
        ElectionRepositoryError::query,
        ElectionRepositoryError::connection,
    )
}

fn row_to_candidate(row: CandidateRow) -> Result<Candidate, ElectionRepositoryError> {
    let status: CandidateStatus = row
        .status
        .parse()
        .map_err(ElectionRepositoryError::query)?;
    Ok(Candidate {
        id: row.id,
        position_id: row.position_id,
        full_name: row.full_name,
        status,
    })
}

#[async_trait]
impl ElectionRepository for DieselElectionRepository {
    async fn find_election(
        &self,
        election_id: Uuid,
    ) -> Result<Option<Election>, ElectionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = super::schema::elections::table
            .find(election_id)
            .select(ElectionRow::as_select())
            .first::<ElectionRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        Ok(row.map(|row| Election {
            id: row.id,
            title: row.title,
        }))
    }

    async fn find_approved_candidate(
        &self,
        election_id: Uuid,
        position_id: Uuid,
        candidate_id: Uuid,
    ) -> Result<Option<Candidate>, ElectionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        // One query checks the whole chain: the candidate exists, is
        // approved, sits on the claimed position, and the position belongs
        // to the claimed election.
        let row = candidates::table
            .inner_join(positions::table)
            .filter(
                candidates::id
                    .eq(candidate_id)
                    .and(candidates::position_id.eq(position_id))
                    .and(candidates::status.eq(CandidateStatus::Approved.as_str()))
                    .and(positions::election_id.eq(election_id)),
            )
            .select(CandidateRow::as_select())
            .first::<CandidateRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        row.map(row_to_candidate).transpose()
    }

    async fn election_snapshot(
        &self,
        election_id: Uuid,
    ) -> Result<ElectionSnapshot, ElectionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        // All three reads share one transaction so a concurrently committing
        // cast is either fully visible or fully absent from the snapshot.
        conn.transaction(|conn| {
            async move {
                let position_rows: Vec<PositionRow> = positions::table
                    .filter(positions::election_id.eq(election_id))
                    .select(PositionRow::as_select())
                    .order_by(positions::title)
                    .load(conn)
                    .await?;

                let candidate_rows: Vec<(Uuid, Uuid, String)> = candidates::table
                    .inner_join(positions::table)
                    .filter(
                        positions::election_id
                            .eq(election_id)
                            .and(candidates::status.eq(CandidateStatus::Approved.as_str())),
                    )
                    .select((
                        candidates::id,
                        candidates::position_id,
                        candidates::full_name,
                    ))
                    .load(conn)
                    .await?;

                let count_rows: Vec<(Uuid, i64)> = ballots::table
                    .inner_join(candidates::table.inner_join(positions::table))
                    .filter(positions::election_id.eq(election_id))
                    .group_by(ballots::candidate_id)
                    .select((ballots::candidate_id, diesel::dsl::count_star()))
                    .load(conn)
                    .await?;

                Ok(ElectionSnapshot {
                    positions: position_rows
                        .into_iter()
                        .map(|row| PositionRecord {
                            id: row.id,
                            title: row.title,
                        })
                        .collect(),
                    candidates: candidate_rows
                        .into_iter()
                        .map(|(id, position_id, full_name)| CandidateRecord {
                            id,
                            position_id,
                            full_name,
                        })
                        .collect(),
                    ballot_counts: count_rows
                        .into_iter()
                        .map(|(candidate_id, ballots)| BallotCount {
                            candidate_id,
                            ballots,
                        })
                        .collect(),
                })
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_rows_convert_with_a_known_status() {
        let row = CandidateRow {
            id: Uuid::from_u128(1),
            position_id: Uuid::from_u128(2),
            full_name: "Asha Mwangi".to_owned(),
            status: "approved".to_owned(),
        };
        let candidate = row_to_candidate(row).expect("valid row");
        assert_eq!(candidate.status, CandidateStatus::Approved);
    }

    #[test]
    fn unknown_candidate_status_is_a_query_error() {
        let row = CandidateRow {
            id: Uuid::from_u128(1),
            position_id: Uuid::from_u128(2),
            full_name: "Asha Mwangi".to_owned(),
            status: "shortlisted".to_owned(),
        };
        let err = row_to_candidate(row).expect_err("rejected");
        assert!(matches!(err, ElectionRepositoryError::Query { .. }));
    }
}
