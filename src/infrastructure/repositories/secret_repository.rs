//! Secret Repository Implementation
//!
//! Keeps the token signing secret in the `secrets` table.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::domain::SecretRepository;
use crate::shared::error::AppError;

const JWT_SECRET_NAME: &str = "jwt";

/// SQLite secret repository implementation.
#[derive(Clone)]
pub struct SqliteSecretRepository {
    pool: SqlitePool,
}

impl SqliteSecretRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SecretRepository for SqliteSecretRepository {
    async fn get_secret(&self) -> Result<Option<Vec<u8>>, AppError> {
        let row: Option<(Vec<u8>,)> = sqlx::query_as("SELECT value FROM secrets WHERE name = ?1")
            .bind(JWT_SECRET_NAME)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(value,)| value))
    }

    async fn put_secret(&self, secret: &[u8]) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO secrets (name, value) VALUES (?1, ?2)
            ON CONFLICT (name) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(JWT_SECRET_NAME)
        .bind(secret)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
