//! Document metadata envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata shared by every document variant.
///
/// The identity never changes once assigned. The revision starts at 0 when
/// the document is created and grows by one with every accepted edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocMeta {
    /// Opaque document identity (UUID v7, so ids sort by creation time)
    #[serde(rename = "_id")]
    pub id: String,

    /// Edit counter
    pub revision: i64,

    /// Creation or last modification instant
    pub timestamp: DateTime<Utc>,

    /// Identity of the author
    pub userid: String,
}

impl DocMeta {
    /// Metadata for a freshly accepted document.
    pub fn new(userid: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7().simple().to_string(),
            revision: 0,
            timestamp: Utc::now(),
            userid: userid.into(),
        }
    }

    /// Metadata for the next revision of the same document.
    pub fn next_revision(&self) -> Self {
        Self {
            id: self.id.clone(),
            revision: self.revision + 1,
            timestamp: Utc::now(),
            userid: self.userid.clone(),
        }
    }

    /// Whether the store has assigned an identity yet.
    pub fn is_assigned(&self) -> bool {
        !self.id.is_empty()
    }
}

impl Default for DocMeta {
    fn default() -> Self {
        Self {
            id: String::new(),
            revision: 0,
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
            userid: String::new(),
        }
    }
}
