//! Room Repository Implementation
//!
//! SQLite implementation of rooms and the slugs that address them.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::domain::{Access, RoomInfo, RoomRepository, SlugInfo};
use crate::shared::error::AppError;

/// SQLite room repository implementation.
#[derive(Clone)]
pub struct SqliteRoomRepository {
    pool: SqlitePool,
}

impl SqliteRoomRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RoomRow {
    title: String,
    description: Option<String>,
    read_code: String,
}

#[derive(Debug, sqlx::FromRow)]
struct SlugRow {
    rpid: String,
    access: String,
}

fn map_unique_violation(err: sqlx::Error) -> AppError {
    match err.as_database_error() {
        Some(db) if db.is_unique_violation() => AppError::Conflict("room slug already taken".into()),
        _ => AppError::Database(err),
    }
}

#[async_trait]
impl RoomRepository for SqliteRoomRepository {
    async fn create(&self, rpid: &str, info: &RoomInfo, write_slug: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO rooms (rpid, title, description, read_code, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(rpid)
        .bind(&info.title)
        .bind(&info.desc)
        .bind(&info.read_code)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        for (slug, access) in [(write_slug, Access::Normal), (info.read_code.as_str(), Access::Read)] {
            sqlx::query("INSERT INTO slugs (slug, rpid, access) VALUES (?1, ?2, ?3)")
                .bind(slug)
                .bind(rpid)
                .bind(access.as_str())
                .execute(&mut *tx)
                .await
                .map_err(map_unique_violation)?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_slug(&self, slug: &str) -> Result<Option<SlugInfo>, AppError> {
        let row = sqlx::query_as::<_, SlugRow>("SELECT rpid, access FROM slugs WHERE slug = ?1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| Ok(SlugInfo { rpid: r.rpid, access: r.access.parse()? }))
            .transpose()
    }

    async fn get_info(&self, rpid: &str) -> Result<Option<RoomInfo>, AppError> {
        let row = sqlx::query_as::<_, RoomRow>(
            "SELECT title, description, read_code FROM rooms WHERE rpid = ?1",
        )
        .bind(rpid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| RoomInfo { title: r.title, desc: r.description, read_code: r.read_code }))
    }

    async fn count(&self) -> Result<i64, AppError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM rooms")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
