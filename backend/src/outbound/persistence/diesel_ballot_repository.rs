//! PostgreSQL-backed cast transaction adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{BallotRepository, BallotRepositoryError};
use crate::domain::{BallotDraft, VoterStatus};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::NewBallotRow;
use super::pool::{DbPool, PoolError};
use super::schema::{ballots, voters};

/// Diesel-backed implementation of the ballot persistence port.
#[derive(Clone)]
pub struct DieselBallotRepository {
    pool: DbPool,
}

impl DieselBallotRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> BallotRepositoryError {
    map_pool_error(error, BallotRepositoryError::connection)
}

/// Error type threaded through the cast transaction.
///
/// Diesel's transaction combinator rolls back on any `Err`, so the domain
/// outcomes ride alongside raw Diesel failures until the final mapping.
#[derive(Debug)]
enum CastTxError {
    AlreadyVoted,
    Diesel(diesel::result::Error),
}

impl From<diesel::result::Error> for CastTxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

fn map_tx_error(error: CastTxError) -> BallotRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match error {
        CastTxError::AlreadyVoted => BallotRepositoryError::AlreadyVoted,
        CastTxError::Diesel(DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            _,
        )) => BallotRepositoryError::DuplicateBallot,
        CastTxError::Diesel(other) => map_diesel_error(
            other,
            BallotRepositoryError::query,
            BallotRepositoryError::connection,
        ),
    }
}

#[async_trait]
impl BallotRepository for DieselBallotRepository {
    async fn record_cast(
        &self,
        voter_id: Uuid,
        cast_at: DateTime<Utc>,
        drafts: &[BallotDraft],
    ) -> Result<u32, BallotRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows: Vec<NewBallotRow> = drafts
            .iter()
            .map(|draft| NewBallotRow {
                id: Uuid::new_v4(),
                voter_id,
                candidate_id: draft.candidate_id,
                position_id: draft.position_id,
                cast_at,
            })
            .collect();

        conn.transaction(|conn| {
            async move {
                // The conditional status flip is the single-vote guard: when
                // two casts race, the second one's UPDATE matches zero rows
                // and the whole transaction rolls back with nothing written.
                let flipped = diesel::update(
                    voters::table.filter(
                        voters::id
                            .eq(voter_id)
                            .and(voters::status.eq(VoterStatus::NotVoted.as_str())),
                    ),
                )
                .set((
                    voters::status.eq(VoterStatus::Voted.as_str()),
                    voters::voted_at.eq(cast_at),
                ))
                .execute(conn)
                .await?;

                if flipped == 0 {
                    return Err(CastTxError::AlreadyVoted);
                }

                // The (voter, position) unique constraint backstops the
                // application-level validation if a duplicate slips through.
                let written = diesel::insert_into(ballots::table)
                    .values(&rows)
                    .execute(conn)
                    .await?;

                Ok(u32::try_from(written).unwrap_or(u32::MAX))
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn already_voted_maps_to_the_domain_outcome() {
        let mapped = map_tx_error(CastTxError::AlreadyVoted);
        assert_eq!(mapped, BallotRepositoryError::AlreadyVoted);
    }

    #[test]
    fn unique_violations_map_to_duplicate_ballot() {
        let diesel_err = diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key value".to_owned()),
        );
        let mapped = map_tx_error(CastTxError::Diesel(diesel_err));
        assert_eq!(mapped, BallotRepositoryError::DuplicateBallot);
    }

    #[test]
    fn other_database_errors_map_to_query_errors() {
        let diesel_err = diesel::result::Error::NotFound;
        let mapped = map_tx_error(CastTxError::Diesel(diesel_err));
        assert!(matches!(mapped, BallotRepositoryError::Query { .. }));
    }
}
