use crate::domain::{
    models::{occurrence::Occurrence, reservation::Reservation},
    ports::{CancelOutcome, ReservationRepository, ReserveOutcome},
};
use crate::error::EngineError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

pub struct PostgresReservationRepo {
    pool: PgPool,
}

impl PostgresReservationRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReservationRepository for PostgresReservationRepo {
    async fn reserve(&self, reservation: &Reservation) -> Result<ReserveOutcome, EngineError> {
        let mut tx = self.pool.begin().await.map_err(EngineError::Database)?;

        // Row lock on the occurrence serializes competing reserve calls;
        // dropping the tx on an early return rolls everything back.
        let occurrence = sqlx::query_as::<_, Occurrence>(
            "SELECT * FROM occurrences WHERE id = $1 FOR UPDATE",
        )
            .bind(&reservation.occurrence_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(EngineError::Database)?;

        let Some(occurrence) = occurrence else {
            return Ok(ReserveOutcome::OccurrenceMissing);
        };

        let duplicate = sqlx::query(
            "SELECT 1 FROM reservations WHERE occurrence_id = $1 AND user_id = $2 AND status = 'CONFIRMED'",
        )
            .bind(&occurrence.id)
            .bind(&reservation.user_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(EngineError::Database)?;
        if duplicate.is_some() {
            return Ok(ReserveOutcome::DuplicateBooking);
        }

        if let Some(capacity) = occurrence.capacity {
            let result = sqlx::query(
                "SELECT COUNT(*) as count FROM reservations WHERE occurrence_id = $1 AND status = 'CONFIRMED'",
            )
                .bind(&occurrence.id)
                .fetch_one(&mut *tx)
                .await
                .map_err(EngineError::Database)?;
            if result.get::<i64, _>("count") >= capacity as i64 {
                return Ok(ReserveOutcome::CapacityExhausted);
            }
        }

        let created = sqlx::query_as::<_, Reservation>(
            "INSERT INTO reservations (id, user_id, occurrence_id, status, created_at) VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
            .bind(&reservation.id)
            .bind(&reservation.user_id)
            .bind(&reservation.occurrence_id)
            .bind(&reservation.status)
            .bind(reservation.created_at)
            .fetch_one(&mut *tx)
            .await;

        let created = match created {
            Ok(row) => row,
            // 23505 = PostgreSQL Unique Violation; the partial index on
            // (user_id, occurrence_id) backstops the duplicate check.
            Err(e) => {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.code().as_deref() == Some("23505")
                {
                    return Ok(ReserveOutcome::DuplicateBooking);
                }
                return Err(EngineError::Database(e));
            }
        };

        tx.commit().await.map_err(EngineError::Database)?;
        Ok(ReserveOutcome::Created(created))
    }

    async fn cancel(
        &self,
        id: &str,
        user_id: &str,
        cancelled_at: DateTime<Utc>,
    ) -> Result<CancelOutcome, EngineError> {
        let cancelled = sqlx::query_as::<_, Reservation>(
            "UPDATE reservations SET status = 'CANCELLED', cancelled_at = $1
             WHERE id = $2 AND user_id = $3 AND status = 'CONFIRMED'
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
        let own_row = sqlx::query("SELECT 1 FROM reservations WHERE id = $1 AND user_id = $2")
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
             WHERE r.user_id = $1 AND r.status = 'CONFIRMED'
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
            "SELECT * FROM reservations WHERE occurrence_id = $1 AND status = 'CONFIRMED' ORDER BY created_at ASC",
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
        let claimed = sqlx::query_as::<_, Reservation>(
            r#"
            UPDATE reservations SET reminded_at = $1
            WHERE id IN (
                SELECT r.id
                FROM reservations r
                JOIN occurrences o ON o.id = r.occurrence_id
                WHERE r.status = 'CONFIRMED' AND r.reminded_at IS NULL
                  AND o.start_time > $2 AND o.start_time <= $3
                ORDER BY o.start_time ASC
                LIMIT $4
                FOR UPDATE OF r SKIP LOCKED
            )
            RETURNING *
            "#,
        )
            .bind(now)
            .bind(now)
            .bind(until)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(EngineError::Database)?;

        Ok(claimed)
    }

    async fn release_reminder_claim(&self, id: &str) -> Result<(), EngineError> {
        sqlx::query("UPDATE reservations SET reminded_at = NULL WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(EngineError::Database)?;
        Ok(())
    }
}
