//! Integration tests for `DieselBallotRepository`.
//!
//! This suite validates the cast transaction against embedded PostgreSQL:
//! the status flip and the ballot inserts commit together, a second cast for
//! the same voter loses even when the two race, and a duplicate position
//! rolls the whole set back.

use backend::domain::ports::{BallotRepository, BallotRepositoryError};
use backend::domain::BallotDraft;
use backend::outbound::persistence::{DbPool, DieselBallotRepository, PoolConfig};
use chrono::Utc;
use pg_embedded_setup_unpriv::TemporaryDatabase;
use postgres::{Client, NoTls};
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;
use uuid::Uuid;

mod support;

use support::{
    format_postgres_error, handle_cluster_setup_failure, provision_database, shared_cluster,
};

struct SeedData {
    voter_id: Uuid,
    president_position: Uuid,
    president_candidate: Uuid,
    secretary_position: Uuid,
    secretary_candidate: Uuid,
}

struct TestContext {
    runtime: Runtime,
    repository: DieselBallotRepository,
    database_url: String,
    seed: SeedData,
    _database: TemporaryDatabase,
}

fn seed_election(url: &str) -> Result<SeedData, String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;

    let election_id = Uuid::new_v4();
    let seed = SeedData {
        voter_id: Uuid::new_v4(),
        president_position: Uuid::new_v4(),
        president_candidate: Uuid::new_v4(),
        secretary_position: Uuid::new_v4(),
        secretary_candidate: Uuid::new_v4(),
    };

    client
        .execute(
            "INSERT INTO elections (id, title) VALUES ($1, $2)",
            &[&election_id, &"Student Council 2026"],
        )
        .map_err(|err| format_postgres_error(&err))?;

    for (position_id, title) in [
        (seed.president_position, "President"),
        (seed.secretary_position, "Secretary"),
    ] {
        client
            .execute(
                "INSERT INTO positions (id, election_id, title) VALUES ($1, $2, $3)",
                &[&position_id, &election_id, &title],
            )
            .map_err(|err| format_postgres_error(&err))?;
    }

    for (candidate_id, position_id, name) in [
        (seed.president_candidate, seed.president_position, "Ada L."),
        (seed.secretary_candidate, seed.secretary_position, "Alan T."),
    ] {
        client
            .execute(
                concat!(
                    "INSERT INTO candidates (id, position_id, full_name, status) ",
                    "VALUES ($1, $2, $3, 'approved')"
                ),
                &[&candidate_id, &position_id, &name],
            )
            .map_err(|err| format_postgres_error(&err))?;
    }

    client
        .execute(
            concat!(
                "INSERT INTO voters (id, election_id, registration_number, email) ",
                "VALUES ($1, $2, 'REG-001', 'voter@example.com')"
            ),
            &[&seed.voter_id, &election_id],
        )
        .map_err(|err| format_postgres_error(&err))?;

    Ok(seed)
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster()?;
    let temp_db = provision_database(cluster)?;
    let database_url = temp_db.url().to_string();

    let seed = seed_election(database_url.as_str())?;

    let config = PoolConfig::new(database_url.as_str())
        .with_max_size(2)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(async { DbPool::new(config).await })
        .map_err(|err| err.to_string())?;

    Ok(TestContext {
        runtime,
        repository: DieselBallotRepository::new(pool),
        database_url,
        seed,
        _database: temp_db,
    })
}

#[fixture]
fn repo_context() -> Option<TestContext> {
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn full_slate(seed: &SeedData) -> [BallotDraft; 2] {
    [
        BallotDraft {
            position_id: seed.president_position,
            candidate_id: seed.president_candidate,
        },
        BallotDraft {
            position_id: seed.secretary_position,
            candidate_id: seed.secretary_candidate,
        },
    ]
}

fn voter_status(url: &str, voter_id: Uuid) -> Result<(String, bool), String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;
    let row = client
        .query_one(
            "SELECT status, voted_at IS NOT NULL FROM voters WHERE id = $1",
            &[&voter_id],
        )
        .map_err(|err| format_postgres_error(&err))?;
    Ok((row.get(0), row.get(1)))
}

fn ballot_count(url: &str, voter_id: Uuid) -> Result<i64, String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;
    let row = client
        .query_one(
            "SELECT COUNT(*) FROM ballots WHERE voter_id = $1",
            &[&voter_id],
        )
        .map_err(|err| format_postgres_error(&err))?;
    Ok(row.get(0))
}

#[rstest]
fn cast_flips_the_voter_and_writes_every_ballot(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: cast_flips_the_voter_and_writes_every_ballot skipped");
        return;
    };

    let repository = context.repository.clone();
    let drafts = full_slate(&context.seed);

    let written = context
        .runtime
        .block_on(async {
            repository
                .record_cast(context.seed.voter_id, Utc::now(), &drafts)
                .await
        })
        .expect("cast succeeds");
    assert_eq!(written, 2);

    let (status, has_voted_at) =
        voter_status(context.database_url.as_str(), context.seed.voter_id).expect("read voter");
    assert_eq!(status, "voted");
    assert!(has_voted_at, "voted_at should be stamped by the cast");
    assert_eq!(
        ballot_count(context.database_url.as_str(), context.seed.voter_id).expect("count ballots"),
        2
    );

    // A replay after commit loses on the status guard and writes nothing.
    let error = context
        .runtime
        .block_on(async {
            repository
                .record_cast(context.seed.voter_id, Utc::now(), &drafts)
                .await
        })
        .expect_err("replayed cast should fail");
    assert_eq!(error, BallotRepositoryError::AlreadyVoted);
    assert_eq!(
        ballot_count(context.database_url.as_str(), context.seed.voter_id).expect("count ballots"),
        2
    );
}

#[rstest]
fn concurrent_casts_admit_exactly_one_winner(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: concurrent_casts_admit_exactly_one_winner skipped");
        return;
    };

    let repository = context.repository.clone();
    let drafts = full_slate(&context.seed);
    let cast_at = Utc::now();

    // Both casts race the conditional status flip; the loser's update
    // matches zero rows once the winner commits, so its transaction rolls
    // back with nothing written.
    let (first, second) = context.runtime.block_on(async {
        tokio::join!(
            repository.record_cast(context.seed.voter_id, cast_at, &drafts),
            repository.record_cast(context.seed.voter_id, cast_at, &drafts),
        )
    });

    let results = [first, second];
    assert_eq!(
        results.iter().filter(|result| result.is_ok()).count(),
        1,
        "exactly one concurrent cast should commit"
    );
    assert!(
        results
            .iter()
            .any(|result| matches!(result, Err(BallotRepositoryError::AlreadyVoted))),
        "the losing cast should observe the voter as already voted"
    );
    assert_eq!(
        ballot_count(context.database_url.as_str(), context.seed.voter_id).expect("count ballots"),
        2,
        "only the winner's ballots should be on disk"
    );
}

#[rstest]
fn duplicate_position_rolls_the_whole_cast_back(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: duplicate_position_rolls_the_whole_cast_back skipped");
        return;
    };

    let repository = context.repository.clone();
    let duplicate = [
        BallotDraft {
            position_id: context.seed.president_position,
            candidate_id: context.seed.president_candidate,
        },
        BallotDraft {
            position_id: context.seed.president_position,
            candidate_id: context.seed.president_candidate,
        },
    ];

    let error = context
        .runtime
        .block_on(async {
            repository
                .record_cast(context.seed.voter_id, Utc::now(), &duplicate)
                .await
        })
        .expect_err("duplicate position should violate the unique constraint");
    assert_eq!(error, BallotRepositoryError::DuplicateBallot);

    // The constraint fired after the status flip; the rollback must undo
    // both so the voter can still cast.
    let (status, has_voted_at) =
        voter_status(context.database_url.as_str(), context.seed.voter_id).expect("read voter");
    assert_eq!(status, "not_voted");
    assert!(!has_voted_at, "voted_at should be rolled back with the flip");
    assert_eq!(
        ballot_count(context.database_url.as_str(), context.seed.voter_id).expect("count ballots"),
        0
    );
}
