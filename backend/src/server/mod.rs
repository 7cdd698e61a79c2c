//! Server construction: configuration, migrations, and dependency wiring.

mod config;

pub use config::{ConfigError, ServerConfig};

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use async_trait::async_trait;
use diesel::Connection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};
#[cfg(debug_assertions)]
use utoipa::OpenApi as _;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use crate::domain::ports::{EmailDelivery, EmailDeliveryError, EmailMessage};
use crate::domain::{OtpConfig, OtpService, TallyService, VotingService};
#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http;
use crate::inbound::http::health::{live, ready, HealthState};
use crate::inbound::http::state::HttpState;
use crate::middleware::Trace;
use crate::outbound::email::SmtpMailer;
use crate::outbound::persistence::{
    DbPool, DieselBallotRepository, DieselElectionRepository, DieselOtpRepository,
    DieselVoterRepository, PoolConfig,
};

/// Migrations compiled into the binary and applied at startup.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Apply pending migrations over a blocking connection.
///
/// Runs before the pool is built; migration DDL does not need async I/O and
/// the server must not accept traffic until the schema is current.
pub fn run_migrations(database_url: &str) -> Result<(), std::io::Error> {
    let mut conn = diesel::pg::PgConnection::establish(database_url)
        .map_err(|err| std::io::Error::other(format!("database connection failed: {err}")))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| std::io::Error::other(format!("migrations failed: {err}")))?;
    Ok(())
}

/// Mailer used when no SMTP relay is configured.
///
/// Fails every attempt, which routes each passcode through the on-screen
/// fallback instead of silently discarding it.
struct UnconfiguredMailer;

#[async_trait]
impl EmailDelivery for UnconfiguredMailer {
    async fn send(&self, _message: &EmailMessage) -> Result<(), EmailDeliveryError> {
        Err(EmailDeliveryError::transport("email delivery not configured"))
    }
}

/// Wire the domain services over the Diesel adapters and the given mailer.
fn build_http_state<M>(pool: DbPool, mailer: M) -> HttpState
where
    M: EmailDelivery + 'static,
{
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    let otp_service = OtpService::new(
        Arc::new(DieselOtpRepository::new(pool.clone())),
        Arc::new(mailer),
        Arc::clone(&clock),
        OtpConfig::default(),
    );

    let elections = Arc::new(DieselElectionRepository::new(pool.clone()));
    let voting = VotingService::new(
        Arc::new(DieselVoterRepository::new(pool.clone())),
        Arc::clone(&elections),
        Arc::new(DieselBallotRepository::new(pool)),
        Arc::new(otp_service),
        clock,
    );

    HttpState::new(Arc::new(voting), Arc::new(TallyService::new(elections)))
}

/// Run the voting server until shutdown.
pub async fn run(config: ServerConfig) -> std::io::Result<()> {
    run_migrations(&config.database_url)?;

    let pool = DbPool::new(PoolConfig::new(&config.database_url))
        .await
        .map_err(|err| std::io::Error::other(err.to_string()))?;

    let state = match config.smtp {
        Some(smtp) => {
            let mailer = SmtpMailer::new(smtp)
                .map_err(|err| std::io::Error::other(err.to_string()))?;
            build_http_state(pool, mailer)
        }
        None => {
            warn!("SMTP not configured; passcodes will use the on-screen fallback");
            build_http_state(pool, UnconfiguredMailer)
        }
    };

    let health_state = web::Data::new(HealthState::new());
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        let app = App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(server_health_state.clone())
            .wrap(Trace)
            .configure(http::configure)
            .service(ready)
            .service(live);

        #[cfg(debug_assertions)]
        let app = app.service(
            SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        );

        app
    })
    .bind(config.bind_addr)?;

    health_state.mark_ready();
    info!(addr = %config.bind_addr, "voting server listening");
    server.run().await
}
