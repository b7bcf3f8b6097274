use crate::domain::{models::occurrence::Occurrence, ports::OccurrenceRepository};
use crate::error::EngineError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct PostgresOccurrenceRepo {
    pool: PgPool,
}

impl PostgresOccurrenceRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OccurrenceRepository for PostgresOccurrenceRepo {
    async fn insert_if_absent(&self, occurrence: &Occurrence) -> Result<bool, EngineError> {
        let result = sqlx::query(
            "INSERT INTO occurrences (id, template_id, title, start_time, capacity, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (template_id, start_time) DO NOTHING",
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
            "INSERT INTO occurrences (id, template_id, title, start_time, capacity, created_at) VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
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
        sqlx::query_as::<_, Occurrence>("SELECT * FROM occurrences WHERE id = $1")
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
            "SELECT * FROM occurrences WHERE start_time > $1 ORDER BY start_time ASC LIMIT $2",
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
            "UPDATE occurrences SET capacity = $1 WHERE id = $2 RETURNING *",
        )
            .bind(capacity)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(EngineError::Database)
    }
}
