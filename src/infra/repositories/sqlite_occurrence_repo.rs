use crate::domain::{models::occurrence::Occurrence, ports::OccurrenceRepository};
use crate::error::EngineError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub struct SqliteOccurrenceRepo {
    pool: SqlitePool,
}

impl SqliteOccurrenceRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OccurrenceRepository for SqliteOccurrenceRepo {
    async fn insert_if_absent(&self, occurrence: &Occurrence) -> Result<bool, EngineError> {
        // Rides on the unique index over (template_id, start_time).
        let result = sqlx::query(
            "INSERT OR IGNORE INTO occurrences (id, template_id, title, start_time, capacity, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
            .bind(&occurrence.id)
            .bind(&occurrence.template_id)
            .bind(&occurrence.title)
            .bind(occurrence.start_time)
            .bind(occurrence.capacity)
            .bind(occurrence.created_at)
            .execute(&self.pool)
            .await
            .map_err(EngineError::Database)?;
        Ok(result.rows_affected() == 1)
    }

    async fn insert(&self, occurrence: &Occurrence) -> Result<Occurrence, EngineError> {
        sqlx::query_as::<_, Occurrence>(
            "INSERT INTO occurrences (id, template_id, title, start_time, capacity, created_at) VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
        )
            .bind(&occurrence.id)
            .bind(&occurrence.template_id)
            .bind(&occurrence.title)
            .bind(occurrence.start_time)
            .bind(occurrence.capacity)
            .bind(occurrence.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(EngineError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Occurrence>, EngineError> {
        sqlx::query_as::<_, Occurrence>("SELECT * FROM occurrences WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(EngineError::Database)
    }

    async fn list_upcoming(
        &self,
        after: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Occurrence>, EngineError> {
        sqlx::query_as::<_, Occurrence>(
            "SELECT * FROM occurrences WHERE start_time > ? ORDER BY start_time ASC LIMIT ?",
        )
            .bind(after)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(EngineError::Database)
    }

    async fn set_capacity(
        &self,
        id: &str,
        capacity: Option<i32>,
    ) -> Result<Option<Occurrence>, EngineError> {
        sqlx::query_as::<_, Occurrence>(
            "UPDATE occurrences SET capacity = ? WHERE id = ? RETURNING *",
        )
            .bind(capacity)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(EngineError::Database)
    }
}
