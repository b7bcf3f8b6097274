use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::infra::clock::SystemClock;
use crate::infra::notify::telegram_notifier::TelegramNotifier;
use crate::infra::repositories::{
    postgres_occurrence_repo::PostgresOccurrenceRepo,
    postgres_reservation_repo::PostgresReservationRepo,
    postgres_template_repo::PostgresTemplateRepo, postgres_user_repo::PostgresUserRepo,
    sqlite_occurrence_repo::SqliteOccurrenceRepo,
    sqlite_reservation_repo::SqliteReservationRepo,
    sqlite_template_repo::SqliteTemplateRepo, sqlite_user_repo::SqliteUserRepo,
};
use crate::state::Engine;

pub async fn bootstrap_engine(config: &Config) -> Engine {
    let database_url = &config.database_url;
    let clock = Arc::new(SystemClock);
    let notifier = Arc::new(TelegramNotifier::new(&config.bot_token));

    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        Engine::new(
            config.clone(),
            Arc::new(PostgresTemplateRepo::new(pool.clone())),
            Arc::new(PostgresOccurrenceRepo::new(pool.clone())),
            Arc::new(PostgresUserRepo::new(pool.clone())),
            Arc::new(PostgresReservationRepo::new(pool.clone())),
            clock,
            notifier,
        )
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        Engine::new(
            config.clone(),
            Arc::new(SqliteTemplateRepo::new(pool.clone())),
            Arc::new(SqliteOccurrenceRepo::new(pool.clone())),
            Arc::new(SqliteUserRepo::new(pool.clone())),
            Arc::new(SqliteReservationRepo::new(pool.clone())),
            clock,
            notifier,
        )
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
