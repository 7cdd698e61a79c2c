//! Embedded PostgreSQL bootstrap for repository integration tests.
//!
//! Suites that exercise the Diesel adapters against a real schema share one
//! embedded cluster per test binary and provision a fresh database per test,
//! with the crate's migrations applied. Environments that cannot start the
//! cluster can opt out with `SKIP_TEST_CLUSTER=1`; otherwise bootstrap
//! failures panic so CI breakage is not masked.

use std::sync::OnceLock;
use std::time::Duration;

use diesel::pg::PgConnection;
use diesel::Connection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};

/// Embedded migrations from the backend/migrations directory.
const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

const CLUSTER_RETRIES: usize = 5;
const CLUSTER_RETRY_DELAY: Duration = Duration::from_millis(500);

static PASSWORD_INIT: OnceLock<()> = OnceLock::new();

/// Pins `PG_PASSWORD` so the password stays consistent across processes that
/// reuse the same data directory.
///
/// `postgresql_embedded` generates a random password per invocation. When the
/// data directory already exists, setup skips `initdb` and the cluster keeps
/// the original password, so later processes would fail authentication
/// without a stable override.
fn ensure_stable_password() {
    PASSWORD_INIT.get_or_init(|| {
        if std::env::var_os("PG_PASSWORD").is_none() {
            std::env::set_var("PG_PASSWORD", "kuravote_embedded_test");
        }
    });
}

/// Returns the process-wide embedded cluster handle, retrying transient
/// bootstrap failures.
pub fn shared_cluster() -> Result<&'static ClusterHandle, String> {
    ensure_stable_password();
    let mut attempt = 1;
    loop {
        match pg_embedded_setup_unpriv::test_support::shared_cluster_handle() {
            Ok(handle) => return Ok(handle),
            Err(error) => {
                if attempt >= CLUSTER_RETRIES {
                    return Err(format!("{error:?}"));
                }
                std::thread::sleep(CLUSTER_RETRY_DELAY);
                attempt += 1;
            }
        }
    }
}

/// Provisions a fresh temporary database with all migrations applied.
pub fn provision_database(cluster: &ClusterHandle) -> Result<TemporaryDatabase, String> {
    let name = format!("kuravote_test_{}", uuid::Uuid::new_v4().simple());
    let database = cluster
        .temporary_database(name)
        .map_err(|error| format!("create temporary database: {error:?}"))?;
    migrate_schema(database.url())?;
    Ok(database)
}

/// Runs all pending Diesel migrations against the given database URL.
fn migrate_schema(url: &str) -> Result<(), String> {
    let mut conn =
        PgConnection::establish(url).map_err(|error| format!("connect for migration: {error}"))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|error| format!("migration: {error}"))?;
    Ok(())
}

/// Returns true when the `SKIP_TEST_CLUSTER` environment variable is set to a
/// truthy value ("1", "true", "yes"; case-insensitive).
fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Handles embedded cluster setup failures consistently across suites.
///
/// When `SKIP_TEST_CLUSTER` is truthy, prints a skip marker and returns
/// `None`. Otherwise, panics with a clear failure message.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}
