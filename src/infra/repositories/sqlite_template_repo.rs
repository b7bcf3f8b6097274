use crate::domain::{models::template::Template, ports::TemplateRepository};
use crate::error::EngineError;
use async_trait::async_trait;
use chrono::NaiveTime;
use sqlx::SqlitePool;

pub struct SqliteTemplateRepo {
    pool: SqlitePool,
}

impl SqliteTemplateRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TemplateRepository for SqliteTemplateRepo {
    async fn insert(&self, template: &Template) -> Result<Template, EngineError> {
        sqlx::query_as::<_, Template>(
            "INSERT INTO templates (id, title, weekday, time_of_day, capacity, active, created_at) VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
            .bind(&template.id)
            .bind(&template.title)
            .bind(template.weekday)
            .bind(template.time_of_day)
            .bind(template.capacity)
            .bind(template.active)
            .bind(template.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(EngineError::Database)
    }

    async fn find_by_slot(
        &self,
        title: &str,
        weekday: i32,
        time_of_day: NaiveTime,
    ) -> Result<Option<Template>, EngineError> {
        sqlx::query_as::<_, Template>(
            "SELECT * FROM templates WHERE title = ? AND weekday = ? AND time_of_day = ?",
        )
            .bind(title)
            .bind(weekday)
            .bind(time_of_day)
            .fetch_optional(&self.pool)
            .await
            .map_err(EngineError::Database)
    }

    async fn list(&self) -> Result<Vec<Template>, EngineError> {
        sqlx::query_as::<_, Template>(
            "SELECT * FROM templates ORDER BY weekday ASC, time_of_day ASC",
        )
            .fetch_all(&self.pool)
            .await
            .map_err(EngineError::Database)
    }

    async fn list_active(&self) -> Result<Vec<Template>, EngineError> {
        sqlx::query_as::<_, Template>(
            "SELECT * FROM templates WHERE active = 1 ORDER BY weekday ASC, time_of_day ASC",
        )
            .fetch_all(&self.pool)
            .await
            .map_err(EngineError::Database)
    }

    async fn set_active(&self, id: &str, active: bool) -> Result<Option<Template>, EngineError> {
        sqlx::query_as::<_, Template>("UPDATE templates SET active = ? WHERE id = ? RETURNING *")
            .bind(active)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(EngineError::Database)
    }
}
