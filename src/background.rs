use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, info_span, warn, Instrument};
use crate::state::Engine;

const RETRY_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY_MS: u64 = 500;

/// Keeps the occurrence horizon filled. Runs a pass immediately so a
/// restarted engine catches up before the first interval elapses.
pub async fn start_generation_worker(engine: Arc<Engine>) {
    info!("Starting occurrence generation worker...");

    let interval = Duration::from_secs(engine.config.generation_interval_secs);
    loop {
        run_generation_pass(&engine).instrument(info_span!("generation_pass")).await;
        sleep(interval).await;
    }
}

async fn run_generation_pass(engine: &Engine) {
    let horizon_days = engine.config.horizon_days;
    for attempt in 1..=RETRY_ATTEMPTS {
        match engine.schedule.generate(horizon_days).await {
            Ok(inserted) => {
                if inserted > 0 {
                    info!(inserted, "Generated new occurrences");
                }
                return;
            }
            Err(e) if e.is_transient() && attempt < RETRY_ATTEMPTS => {
                warn!(attempt, error = %e, "Generation pass hit transient error, retrying");
                sleep(Duration::from_millis(RETRY_BASE_DELAY_MS * 2u64.pow(attempt - 1))).await;
            }
            Err(e) => {
                error!("Generation pass failed: {:?}", e);
                return;
            }
        }
    }
}

/// Scans for due reminders every `reminder_scan_interval_secs`. Delivery
/// bookkeeping lives in the reminder service; this loop only schedules
/// passes and retries transient failures of a whole pass.
pub async fn start_reminder_worker(engine: Arc<Engine>) {
    info!("Starting reminder worker...");

    let interval = Duration::from_secs(engine.config.reminder_scan_interval_secs);
    loop {
        run_reminder_pass(&engine).instrument(info_span!("reminder_scan")).await;
        sleep(interval).await;
    }
}

async fn run_reminder_pass(engine: &Engine) {
    for attempt in 1..=RETRY_ATTEMPTS {
        match engine.reminders.run_scan().await {
            Ok(_) => return,
            Err(e) if e.is_transient() && attempt < RETRY_ATTEMPTS => {
                warn!(attempt, error = %e, "Reminder scan hit transient error, retrying");
                sleep(Duration::from_millis(RETRY_BASE_DELAY_MS * 2u64.pow(attempt - 1))).await;
            }
            Err(e) => {
                error!("Reminder scan failed: {:?}", e);
                return;
            }
        }
    }
}
