use crate::domain::{models::user::User, ports::UserRepository};
use crate::error::EngineError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteUserRepo {
    pool: SqlitePool,
}

impl SqliteUserRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepo {
    async fn upsert(&self, user: &User) -> Result<User, EngineError> {
        // On conflict the stored row keeps its id and created_at; only the
        // display name follows the frontend.
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, external_id, display_name, created_at) VALUES (?, ?, ?, ?)
             ON CONFLICT(external_id) DO UPDATE SET display_name = excluded.display_name
             RETURNING *",
        )
            .bind(&user.id)
            .bind(&user.external_id)
            .bind(&user.display_name)
            .bind(user.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(EngineError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, EngineError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(EngineError::Database)
    }
}
