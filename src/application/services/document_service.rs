//! Document Service
//!
//! The write pipeline shared by messages and characters:
//! parse -> validate -> (room lock) check relations -> persist.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::{DocMeta, Document, DocumentKind, DocumentRepository, MessageBody};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;

/// One async mutex per room.
///
/// Held across the relation check and the write so a check never races a
/// concurrent write to the same room. A room's entry is dropped again once
/// nobody holds or waits for its lock.
#[derive(Default)]
pub struct RoomLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl RoomLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, room_id: &str) -> RoomGuard {
        let lock = self
            .locks
            .entry(room_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = lock.lock_owned().await;

        RoomGuard {
            guard: Some(guard),
            room_id: room_id.to_string(),
            locks: self.locks.clone(),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.len()
    }
}

/// Exclusive access to one room until dropped.
pub struct RoomGuard {
    guard: Option<OwnedMutexGuard<()>>,
    room_id: String,
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl Drop for RoomGuard {
    fn drop(&mut self) {
        self.guard.take();
        // Only the map's own reference left: no holder, no waiter
        self.locks
            .remove_if(&self.room_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

pub struct DocumentService {
    documents: Arc<dyn DocumentRepository>,
    locks: RoomLocks,
}

impl DocumentService {
    pub fn new(documents: Arc<dyn DocumentRepository>) -> Self {
        Self { documents, locks: RoomLocks::new() }
    }

    /// Accept a new document into a room and return it with assigned metadata.
    pub async fn create(
        &self,
        room_id: &str,
        kind: DocumentKind,
        raw: &[u8],
        userid: &str,
    ) -> Result<Document, AppError> {
        let result = self.try_create(room_id, kind, raw, userid).await;
        record_outcome(kind, &result);
        result
    }

    async fn try_create(
        &self,
        room_id: &str,
        kind: DocumentKind,
        raw: &[u8],
        userid: &str,
    ) -> Result<Document, AppError> {
        let mut doc = Document::parse_body(kind, raw)?;
        doc.validate()?;

        let _guard = self.locks.lock(room_id).await;
        doc.check_relations(room_id, self.documents.as_ref()).await?;

        *doc.metadata_mut() = DocMeta::new(userid);
        self.documents.insert(room_id, &doc).await?;

        tracing::info!(
            room_id = %room_id,
            kind = %kind,
            id = %doc.metadata().id,
            "Document accepted"
        );
        Ok(doc)
    }

    /// Replace an existing document with a new revision authored by the
    /// same user.
    pub async fn edit(
        &self,
        room_id: &str,
        kind: DocumentKind,
        id: &str,
        raw: &[u8],
        userid: &str,
    ) -> Result<Document, AppError> {
        let result = self.try_edit(room_id, kind, id, raw, userid).await;
        record_outcome(kind, &result);
        result
    }

    async fn try_edit(
        &self,
        room_id: &str,
        kind: DocumentKind,
        id: &str,
        raw: &[u8],
        userid: &str,
    ) -> Result<Document, AppError> {
        let mut doc = Document::parse_body(kind, raw)?;
        doc.validate()?;

        let _guard = self.locks.lock(room_id).await;

        let current = self
            .documents
            .get_document(room_id, kind, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} {}", kind, id)))?;

        if current.metadata().userid != userid {
            return Err(AppError::Forbidden("only the author may edit this document".into()));
        }
        if let (Document::Message(old), Document::Message(new)) = (&current, &doc) {
            if !same_message_type(&old.body, &new.body) {
                return Err(AppError::BadRequest(format!(
                    "Msg: type cannot change from {} to {}",
                    old.body.kind, new.body.kind
                )));
            }
        }

        doc.check_relations(room_id, self.documents.as_ref()).await?;

        let previous = current.metadata();
        *doc.metadata_mut() = previous.next_revision();
        self.documents.update(room_id, &doc, previous.revision).await?;

        tracing::info!(
            room_id = %room_id,
            kind = %kind,
            id = %id,
            revision = doc.metadata().revision,
            "Document revised"
        );
        Ok(doc)
    }

    /// Every revision of a document, oldest first.
    pub async fn history(&self, room_id: &str, kind: DocumentKind, id: &str) -> Result<Vec<Document>, AppError> {
        let revisions = self.documents.history(room_id, kind, id).await?;
        if revisions.is_empty() {
            return Err(AppError::NotFound(format!("{} {}", kind, id)));
        }
        Ok(revisions)
    }
}

fn same_message_type(old: &MessageBody, new: &MessageBody) -> bool {
    old.kind == new.kind
}

fn record_outcome(kind: DocumentKind, result: &Result<Document, AppError>) {
    match result {
        Ok(_) => metrics::record_document_accepted(kind.as_str()),
        Err(e @ (AppError::Decode(_) | AppError::Validation(_) | AppError::Relation(_))) => {
            tracing::debug!(kind = %kind, error = %e, "Document rejected");
            metrics::record_document_rejected(kind.as_str(), e.kind());
        }
        Err(_) => {}
    }
}
