use booking_engine::{
    config::Config,
    domain::models::template::Template,
    domain::models::user::ChatIdentity,
    domain::ports::{Clock, Notifier},
    error::EngineError,
    infra::repositories::{
        sqlite_occurrence_repo::SqliteOccurrenceRepo,
        sqlite_reservation_repo::SqliteReservationRepo,
        sqlite_template_repo::SqliteTemplateRepo,
        sqlite_user_repo::SqliteUserRepo,
    },
    state::Engine,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Captures outgoing messages instead of talking to Telegram. Failure
/// injection drains per call, so `fail_next_transient(2)` makes exactly
/// the next two deliveries fail.
pub struct MockNotifier {
    sent: Mutex<Vec<(String, String)>>,
    fail_transient: Mutex<u32>,
    fail_permanent: Mutex<u32>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_transient: Mutex::new(0),
            fail_permanent: Mutex::new(0),
        }
    }

    #[allow(dead_code)]
    pub fn fail_next_transient(&self, n: u32) {
        *self.fail_transient.lock().unwrap() = n;
    }

    #[allow(dead_code)]
    pub fn fail_next_permanent(&self, n: u32) {
        *self.fail_permanent.lock().unwrap() = n;
    }

    #[allow(dead_code)]
    pub fn sent_messages(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify(&self, recipient_external_id: &str, text: &str) -> Result<(), EngineError> {
        {
            let mut remaining = self.fail_transient.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(EngineError::Transient("simulated delivery failure".to_string()));
            }
        }
        {
            let mut remaining = self.fail_permanent.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(EngineError::Notify("simulated rejection".to_string()));
            }
        }
        self.sent
            .lock()
            .unwrap()
            .push((recipient_external_id.to_string(), text.to_string()));
        Ok(())
    }
}

pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(start) }
    }

    #[allow(dead_code)]
    pub fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    #[allow(dead_code)]
    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap() = to;
    }

    #[allow(dead_code)]
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

#[allow(dead_code)]
pub struct TestEngine {
    pub engine: Engine,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub clock: Arc<ManualClock>,
    pub notifier: Arc<MockNotifier>,
}

impl TestEngine {
    /// Clock starts on a Monday morning, 2026-03-02 09:00 in Berlin.
    pub async fn new() -> Self {
        Self::new_at(Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap()).await
    }

    pub async fn new_at(start: DateTime<Utc>) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            bot_token: "test-token".to_string(),
            timezone: chrono_tz::Europe::Berlin,
            horizon_days: 7,
            reminder_lead_minutes: 120,
            generation_interval_secs: 3600,
            reminder_scan_interval_secs: 60,
        };

        let clock = Arc::new(ManualClock::new(start));
        let notifier = Arc::new(MockNotifier::new());

        let engine = Engine::new(
            config,
            Arc::new(SqliteTemplateRepo::new(pool.clone())),
            Arc::new(SqliteOccurrenceRepo::new(pool.clone())),
            Arc::new(SqliteUserRepo::new(pool.clone())),
            Arc::new(SqliteReservationRepo::new(pool.clone())),
            clock.clone(),
            notifier.clone(),
        );

        Self { engine, pool, db_filename, clock, notifier }
    }

    #[allow(dead_code)]
    pub async fn seed_template(
        &self,
        title: &str,
        weekday: i32,
        time: &str,
        capacity: Option<i32>,
    ) -> Template {
        self.engine
            .schedule
            .create_template(
                title.to_string(),
                weekday,
                NaiveTime::parse_from_str(time, "%H:%M").unwrap(),
                capacity,
            )
            .await
            .expect("Failed to seed template")
    }
}

impl Drop for TestEngine {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}

#[allow(dead_code)]
pub fn identity(tag: &str) -> ChatIdentity {
    ChatIdentity {
        external_id: format!("tg-{tag}"),
        display_name: format!("User {tag}"),
    }
}
