use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use tracing::{error, info, warn};

use crate::domain::models::occurrence::Occurrence;
use crate::domain::models::reservation::Reservation;
use crate::domain::ports::{Clock, Notifier, OccurrenceRepository, ReservationRepository, UserRepository};
use crate::error::EngineError;

/// Upper bound on reservations claimed per scan. A backlog larger than this
/// drains over consecutive scans instead of producing one huge burst.
const CLAIM_BATCH_LIMIT: i64 = 100;

pub struct ReminderService {
    reservations: Arc<dyn ReservationRepository>,
    occurrences: Arc<dyn OccurrenceRepository>,
    users: Arc<dyn UserRepository>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    timezone: Tz,
    lead: Duration,
    scan_interval: Duration,
}

impl ReminderService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        reservations: Arc<dyn ReservationRepository>,
        occurrences: Arc<dyn OccurrenceRepository>,
        users: Arc<dyn UserRepository>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        timezone: Tz,
        lead_minutes: i64,
        scan_interval_secs: u64,
    ) -> Self {
        Self {
            reservations,
            occurrences,
            users,
            notifier,
            clock,
            timezone,
            lead: Duration::minutes(lead_minutes),
            scan_interval: Duration::seconds(scan_interval_secs as i64),
        }
    }

    /// One reminder pass. Due reservations are claimed in the store before
    /// any message goes out, so a second engine instance scanning the same
    /// rows sends nothing. A transient delivery failure releases the claim
    /// for the next scan; a permanent one keeps it, dropping the reminder
    /// rather than risking a duplicate. Returns the number delivered.
    pub async fn run_scan(&self) -> Result<u64, EngineError> {
        let now = self.clock.now();
        let until = now + self.lead;

        let claimed = self.reservations.claim_due_reminders(now, until, CLAIM_BATCH_LIMIT).await?;
        if claimed.is_empty() {
            return Ok(0);
        }

        let mut sent = 0u64;
        for reservation in claimed {
            match self.send_one(&reservation, now).await {
                Ok(()) => sent += 1,
                Err(e) if e.is_transient() => {
                    warn!(
                        reservation_id = %reservation.id,
                        error = %e,
                        "Reminder delivery failed, releasing claim for retry"
                    );
                    self.reservations.release_reminder_claim(&reservation.id).await?;
                }
                Err(e) => {
                    error!(
                        reservation_id = %reservation.id,
                        error = %e,
                        "Dropping reminder after permanent failure"
                    );
                }
            }
        }

        info!(sent, "Reminder scan finished");
        Ok(sent)
    }

    async fn send_one(
        &self,
        reservation: &Reservation,
        now: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        let occurrence = self
            .occurrences
            .find_by_id(&reservation.occurrence_id)
            .await?
            .ok_or_else(|| {
                EngineError::Invariant(format!(
                    "reservation {} references missing occurrence {}",
                    reservation.id, reservation.occurrence_id
                ))
            })?;
        let user = self.users.find_by_id(&reservation.user_id).await?.ok_or_else(|| {
            EngineError::Invariant(format!(
                "reservation {} references missing user {}",
                reservation.id, reservation.user_id
            ))
        })?;

        let text = self.render_text(&occurrence, now);
        self.notifier.notify(&user.external_id, &text).await
    }

    fn render_text(&self, occurrence: &Occurrence, now: DateTime<Utc>) -> String {
        let local_start = occurrence.start_time.with_timezone(&self.timezone);
        let when = local_start.format("%Y-%m-%d %H:%M");

        // A claim more than one scan interval past its due point means the
        // engine was down; say so instead of pretending the timing is normal.
        let due_at = occurrence.start_time - self.lead;
        if now - due_at > self.scan_interval {
            format!("Late reminder: {} starts at {}.", occurrence.title, when)
        } else {
            format!("Reminder: {} starts at {}.", occurrence.title, when)
        }
    }
}
