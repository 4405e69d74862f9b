//! Document Repository Implementation
//!
//! SQLite implementation of the DocumentRepository trait. The current
//! revision of each document lives in `documents`; every accepted revision
//! is also appended to `document_revisions`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::domain::{
    Character, DocMeta, Document, DocumentKind, DocumentRepository, Message,
};
use crate::shared::error::AppError;

/// SQLite document repository implementation.
#[derive(Clone)]
pub struct SqliteDocumentRepository {
    pool: SqlitePool,
}

impl SqliteDocumentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn list(&self, room_id: &str, kind: DocumentKind) -> Result<Vec<Document>, AppError> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, kind, revision, timestamp, userid, body
            FROM documents
            WHERE rpid = ?1 AND kind = ?2
            ORDER BY seq ASC
            "#,
        )
        .bind(room_id)
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DocumentRow::into_document).collect()
    }
}

/// Row shape shared by `documents` and `document_revisions` queries.
#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    id: String,
    kind: String,
    revision: i64,
    timestamp: DateTime<Utc>,
    userid: String,
    body: String,
}

impl DocumentRow {
    fn into_document(self) -> Result<Document, AppError> {
        let kind: DocumentKind = self.kind.parse()?;
        let meta = DocMeta {
            id: self.id,
            revision: self.revision,
            timestamp: self.timestamp,
            userid: self.userid,
        };
        Document::from_stored(kind, meta, &self.body)
    }
}

#[async_trait]
impl DocumentRepository for SqliteDocumentRepository {
    async fn get_character(&self, room_id: &str, chara_id: &str) -> Result<Option<Character>, AppError> {
        match self.get_document(room_id, DocumentKind::Character, chara_id).await? {
            Some(Document::Character(chara)) => Ok(Some(chara)),
            _ => Ok(None),
        }
    }

    async fn get_document(
        &self,
        room_id: &str,
        kind: DocumentKind,
        id: &str,
    ) -> Result<Option<Document>, AppError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, kind, revision, timestamp, userid, body
            FROM documents
            WHERE rpid = ?1 AND kind = ?2 AND id = ?3
            "#,
        )
        .bind(room_id)
        .bind(kind.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(DocumentRow::into_document).transpose()
    }

    async fn list_messages(&self, room_id: &str) -> Result<Vec<Message>, AppError> {
        let docs = self.list(room_id, DocumentKind::Message).await?;
        Ok(docs
            .into_iter()
            .filter_map(|doc| match doc {
                Document::Message(msg) => Some(msg),
                Document::Character(_) => None,
            })
            .collect())
    }

    async fn list_characters(&self, room_id: &str) -> Result<Vec<Character>, AppError> {
        let docs = self.list(room_id, DocumentKind::Character).await?;
        Ok(docs
            .into_iter()
            .filter_map(|doc| match doc {
                Document::Character(chara) => Some(chara),
                Document::Message(_) => None,
            })
            .collect())
    }

    async fn insert(&self, room_id: &str, doc: &Document) -> Result<(), AppError> {
        let meta = doc.metadata();
        if !meta.is_assigned() {
            return Err(AppError::Internal("refusing to store a document without identity".into()));
        }
        let body = doc.body_json()?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO documents (id, rpid, kind, revision, timestamp, userid, body)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&meta.id)
        .bind(room_id)
        .bind(doc.kind().as_str())
        .bind(meta.revision)
        .bind(meta.timestamp)
        .bind(&meta.userid)
        .bind(&body)
        .execute(&mut *tx)
        .await?;

        insert_revision(&mut tx, meta, &body).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn update(&self, room_id: &str, doc: &Document, previous_revision: i64) -> Result<(), AppError> {
        let meta = doc.metadata();
        let body = doc.body_json()?;

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE documents
            SET revision = ?1, timestamp = ?2, body = ?3
            WHERE id = ?4 AND rpid = ?5 AND kind = ?6 AND revision = ?7
            "#,
        )
        .bind(meta.revision)
        .bind(meta.timestamp)
        .bind(&body)
        .bind(&meta.id)
        .bind(room_id)
        .bind(doc.kind().as_str())
        .bind(previous_revision)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "{} {} changed since revision {}",
                doc.kind(),
                meta.id,
                previous_revision
            )));
        }

        insert_revision(&mut tx, meta, &body).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn history(&self, room_id: &str, kind: DocumentKind, id: &str) -> Result<Vec<Document>, AppError> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT r.id, d.kind, r.revision, r.timestamp, r.userid, r.body
            FROM document_revisions r
            JOIN documents d ON d.id = r.id
            WHERE d.rpid = ?1 AND d.kind = ?2 AND r.id = ?3
            ORDER BY r.revision ASC
            "#,
        )
        .bind(room_id)
        .bind(kind.as_str())
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DocumentRow::into_document).collect()
    }
}

async fn insert_revision(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    meta: &DocMeta,
    body: &str,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO document_revisions (id, revision, timestamp, userid, body)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&meta.id)
    .bind(meta.revision)
    .bind(meta.timestamp)
    .bind(&meta.userid)
    .bind(body)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
