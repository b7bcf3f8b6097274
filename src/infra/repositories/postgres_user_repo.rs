use crate::domain::{models::user::User, ports::UserRepository};
use crate::error::EngineError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresUserRepo {
    pool: PgPool,
}

impl PostgresUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepo {
    async fn upsert(&self, user: &User) -> Result<User, EngineError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, external_id, display_name, created_at) VALUES ($1, $2, $3, $4)
             ON CONFLICT (external_id) DO UPDATE SET display_name = excluded.display_name
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
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(EngineError::Database)
    }
}
