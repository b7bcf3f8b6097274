use crate::domain::{
    models::reservation::Reservation,
    ports::{CancelOutcome, ReservationRepository, ReserveOutcome},
};
use crate::error::EngineError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub struct SqliteReservationRepo {
    pool: SqlitePool,
}

impl SqliteReservationRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReservationRepository for SqliteReservationRepo {
    async fn reserve(&self, reservation: &Reservation) -> Result<ReserveOutcome, EngineError> {
        // Single guarded insert. SQLite runs it under the write lock, so the
        // duplicate and capacity checks cannot race with another writer.
        let created = sqlx::query_as::<_, Reservation>(
            "INSERT INTO reservations (id, user_id, occurrence_id, status, created_at)
             SELECT ?, ?, o.id, 'CONFIRMED', ?
             FROM occurrences o
             WHERE o.id = ?
               AND NOT EXISTS (
                   SELECT 1 FROM reservations r
                   WHERE r.occurrence_id = o.id AND r.user_id = ? AND r.status = 'CONFIRMED'
               )
               AND (
                   o.capacity IS NULL
                   OR (SELECT COUNT(*) FROM reservations r2
                       WHERE r2.occurrence_id = o.id AND r2.status = 'CONFIRMED') < o.capacity
               )
             RETURNING *",
        )
            .bind(&reservation.id)
            .bind(&reservation.user_id)
            .bind(reservation.created_at)
            .bind(&reservation.occurrence_id)
            .bind(&reservation.user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(EngineError::Database)?;

        let Some(created) = created else {
            return self.classify_rejection(reservation).await;
        };
        Ok(ReserveOutcome::Created(created))
    }

    async fn cancel(
        &self,
        id: &str,
        user_id: &str,
        cancelled_at: DateTime<Utc>,
    ) -> Result<CancelOutcome, EngineError> {
        let cancelled = sqlx::query_as::<_, Reservation>(
            "UPDATE reservations SET status = 'CANCELLED', cancelled_at = ?
             WHERE id = ? AND user_id = ? AND status = 'CONFIRMED'
             RETURNING *",
        )
            .bind(cancelled_at)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(EngineError::Database)?;

        if let Some(reservation) = cancelled {
            return Ok(CancelOutcome::Cancelled(reservation));
        }

        // Someone else's reservation reads as missing, same as no row at all.
        let own_row = sqlx::query("SELECT 1 FROM reservations WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(EngineError::Database)?;

        if own_row.is_some() {
            Ok(CancelOutcome::AlreadyCancelled)
        } else {
            Ok(CancelOutcome::NotFound)
        }
    }

    async fn list_confirmed_for_user(&self, user_id: &str) -> Result<Vec<Reservation>, EngineError> {
        sqlx::query_as::<_, Reservation>(
            "SELECT r.* FROM reservations r
             JOIN occurrences o ON o.id = r.occurrence_id
             WHERE r.user_id = ? AND r.status = 'CONFIRMED'
             ORDER BY o.start_time ASC",
        )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(EngineError::Database)
    }

    async fn list_confirmed_for_occurrence(
        &self,
        occurrence_id: &str,
    ) -> Result<Vec<Reservation>, EngineError> {
        sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE occurrence_id = ? AND status = 'CONFIRMED' ORDER BY created_at ASC",
        )
            .bind(occurrence_id)
            .fetch_all(&self.pool)
            .await
            .map_err(EngineError::Database)
    }

    async fn claim_due_reminders(
        &self,
        now: DateTime<Utc>,
        until: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Reservation>, EngineError> {
        sqlx::query_as::<_, Reservation>(
            "UPDATE reservations SET reminded_at = ?
             WHERE id IN (
                 SELECT r.id FROM reservations r
                 JOIN occurrences o ON o.id = r.occurrence_id
                 WHERE r.status = 'CONFIRMED' AND r.reminded_at IS NULL
                   AND o.start_time > ? AND o.start_time <= ?
                 LIMIT ?
             )
             RETURNING *",
        )
            .bind(now)
            .bind(now)
            .bind(until)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(EngineError::Database)
    }

    async fn release_reminder_claim(&self, id: &str) -> Result<(), EngineError> {
        sqlx::query("UPDATE reservations SET reminded_at = NULL WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(EngineError::Database)?;
        Ok(())
    }
}

impl SqliteReservationRepo {
    /// Figures out which guard refused the insert.
    async fn classify_rejection(
        &self,
        reservation: &Reservation,
    ) -> Result<ReserveOutcome, EngineError> {
        let occurrence = sqlx::query("SELECT 1 FROM occurrences WHERE id = ?")
            .bind(&reservation.occurrence_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(EngineError::Database)?;
        if occurrence.is_none() {
            return Ok(ReserveOutcome::OccurrenceMissing);
        }

        let duplicate = sqlx::query(
            "SELECT 1 FROM reservations WHERE occurrence_id = ? AND user_id = ? AND status = 'CONFIRMED'",
        )
            .bind(&reservation.occurrence_id)
            .bind(&reservation.user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(EngineError::Database)?;
        if duplicate.is_some() {
            return Ok(ReserveOutcome::DuplicateBooking);
        }

        Ok(ReserveOutcome::CapacityExhausted)
    }
}
