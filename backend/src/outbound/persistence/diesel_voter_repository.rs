//! PostgreSQL-backed voter registry adapter.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{VoterRepository, VoterRepositoryError};
use crate::domain::{EmailAddress, Voter, VoterStatus};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::VoterRow;
use super::pool::{DbPool, PoolError};
use super::schema::voters;

/// Diesel-backed implementation of the voter registry port.
#[derive(Clone)]
pub struct DieselVoterRepository {
    pool: DbPool,
}

impl DieselVoterRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> VoterRepositoryError {
    map_pool_error(error, VoterRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> VoterRepositoryError {
    map_diesel_error(
        error,
        VoterRepositoryError::query,
        VoterRepositoryError::connection,
    )
}

/// Convert a database row into a validated domain voter.
///
/// An unparseable status or email means the row was written outside the
/// application's invariants; that surfaces as a query error rather than a
/// silently coerced value.
pub(super) fn row_to_voter(row: VoterRow) -> Result<Voter, VoterRepositoryError> {
    let status: VoterStatus = row
        .status
        .parse()
        .map_err(VoterRepositoryError::query)?;
    let email = row
        .email
        .map(EmailAddress::new)
        .transpose()
        .map_err(|err| VoterRepositoryError::query(err.to_string()))?;

    Ok(Voter {
        id: row.id,
        election_id: row.election_id,
        registration_number: row.registration_number,
        email,
        status,
        voted_at: row.voted_at,
    })
}

#[async_trait]
impl VoterRepository for DieselVoterRepository {
    async fn find_by_registration(
        &self,
        election_id: Uuid,
        registration_number: &str,
    ) -> Result<Option<Voter>, VoterRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = voters::table
            .filter(
                voters::election_id
                    .eq(election_id)
                    .and(voters::registration_number.eq(registration_number)),
            )
            .select(VoterRow::as_select())
            .first::<VoterRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        row.map(row_to_voter).transpose()
    }
}
