//! PostgreSQL-backed passcode store adapter.
//!
//! The two operations here carry the store's atomicity guarantees:
//! issuance supersedes prior live codes inside one transaction, and
//! consumption is a single guarded `UPDATE` whose affected-row count decides
//! the outcome, so two concurrent verifications of the same code cannot both
//! succeed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{OtpConsumeOutcome, OtpRepository, OtpRepositoryError};
use crate::domain::{EmailAddress, OtpCode, OtpRecord, OtpState};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::NewOtpRow;
use super::pool::{DbPool, PoolError};
use super::schema::email_otps;

/// Diesel-backed implementation of the passcode store port.
#[derive(Clone)]
pub struct DieselOtpRepository {
    pool: DbPool,
}

impl DieselOtpRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> OtpRepositoryError {
    map_pool_error(error, OtpRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> OtpRepositoryError {
    map_diesel_error(
        error,
        OtpRepositoryError::query,
        OtpRepositoryError::connection,
    )
}

#[async_trait]
impl OtpRepository for DieselOtpRepository {
    async fn issue(&self, record: &OtpRecord) -> Result<(), OtpRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let new_row = NewOtpRow {
            id: record.id,
            email: record.email.as_str(),
            code: record.code.as_str(),
            created_at: record.created_at,
            expires_at: record.expires_at,
            state: record.state.as_str(),
        };

        // Invalidate-then-insert in one transaction: between commit points
        // the address never has more than one live code.
        conn.transaction(|conn| {
            async move {
                diesel::update(
                    email_otps::table.filter(
                        email_otps::email
                            .eq(new_row.email)
                            .and(email_otps::state.eq(OtpState::Live.as_str())),
                    ),
                )
                .set(email_otps::state.eq(OtpState::Used.as_str()))
                .execute(conn)
                .await?;

                diesel::insert_into(email_otps::table)
                    .values(&new_row)
                    .execute(conn)
                    .await?;

                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel)
    }

    async fn consume_live(
        &self,
        email: &EmailAddress,
        code: &OtpCode,
        now: DateTime<Utc>,
    ) -> Result<OtpConsumeOutcome, OtpRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        // The guarded update is the whole consumption: whichever caller's
        // UPDATE lands first flips the row, every later one affects zero rows.
        let consumed = diesel::update(
            email_otps::table.filter(
                email_otps::email
                    .eq(email.as_str())
                    .and(email_otps::code.eq(code.as_str()))
                    .and(email_otps::state.eq(OtpState::Live.as_str()))
                    .and(email_otps::expires_at.ge(now)),
            ),
        )
        .set(email_otps::state.eq(OtpState::Used.as_str()))
        .execute(&mut conn)
        .await
        .map_err(map_diesel)?;

        if consumed > 0 {
            return Ok(OtpConsumeOutcome::Consumed);
        }

        // Zero rows: either the code never matched a live record, or it
        // matched one whose deadline has passed. A follow-up count tells the
        // two apart; the expired row stays live so the audit trail keeps the
        // issuance as-was.
        let expired_matches: i64 = email_otps::table
            .filter(
                email_otps::email
                    .eq(email.as_str())
                    .and(email_otps::code.eq(code.as_str()))
                    .and(email_otps::state.eq(OtpState::Live.as_str())),
            )
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel)?;

        if expired_matches > 0 {
            Ok(OtpConsumeOutcome::Expired)
        } else {
            Ok(OtpConsumeOutcome::NotFound)
        }
    }
}
