pub mod background;
pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod state;

use std::sync::Arc;

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::background::{start_generation_worker, start_reminder_worker};
use crate::config::Config;
use crate::domain::services::defaults::DEFAULT_SCHEDULE;
use crate::infra::factory::bootstrap_engine;

pub fn init_logging() -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily("./logs", "booking-engine.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("info,booking_engine=debug"));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .pretty()
        .with_target(false)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()));

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .init();

    info!("Logging initialized. Writing JSON logs to ./logs/");
    guard
}

pub async fn run() {
    let _guard = init_logging();

    let config = Config::from_env();
    let engine = Arc::new(bootstrap_engine(&config).await);

    let seeded = engine
        .schedule
        .seed_templates(DEFAULT_SCHEDULE)
        .await
        .expect("Failed to seed default schedule");
    if seeded > 0 {
        info!(seeded, "Seeded default schedule templates");
    }

    let generation_engine = engine.clone();
    tokio::spawn(async move {
        start_generation_worker(generation_engine).await;
    });

    info!("🚀 Booking engine running");
    start_reminder_worker(engine).await;
}
