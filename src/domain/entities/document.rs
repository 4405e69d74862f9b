//! The document union and its repository trait.
//!
//! Every room holds two kinds of documents, messages and characters. Both
//! share one metadata envelope and the same pipeline:
//! parse -> validate -> check relations -> persist.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::character::{Character, CharacterBody};
use super::message::{Message, MessageBody};
use super::meta::DocMeta;
use super::validation::ValidationError;
use crate::shared::error::AppError;

/// Which variant a document is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Message,
    Character,
}

impl DocumentKind {
    /// Collection name, used both as the storage tag and the chat stream type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Message => "msgs",
            Self::Character => "charas",
        }
    }
}

impl std::str::FromStr for DocumentKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "msgs" => Ok(Self::Message),
            "charas" => Ok(Self::Character),
            other => Err(AppError::Internal(format!("unknown document kind '{}'", other))),
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Self-contained part of a document variant.
pub trait DocumentBody: Serialize + DeserializeOwned + Clone + Send + Sync {
    const KIND: DocumentKind;

    /// Pure field-rule check. Stops at the first failing rule.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// A document body paired with its metadata. The two are created and
/// dropped together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doc<B> {
    #[serde(flatten)]
    pub meta: DocMeta,

    #[serde(flatten)]
    pub body: B,
}

impl<B: DocumentBody> Doc<B> {
    /// Decode a raw JSON payload into an unassigned document.
    ///
    /// Only checks the shape of the payload; semantic rules are left to
    /// [`Doc::validate`].
    pub fn parse_body(raw: &[u8]) -> Result<Self, AppError> {
        let value: serde_json::Value =
            serde_json::from_slice(raw).map_err(|e| AppError::Decode(e.to_string()))?;
        if !value.is_object() {
            return Err(AppError::Decode("expected a JSON object".into()));
        }
        let body = serde_json::from_value(value).map_err(|e| AppError::Decode(e.to_string()))?;

        Ok(Self { meta: DocMeta::default(), body })
    }

    /// Rebuild a stored document from its metadata and serialized body.
    pub fn from_stored(meta: DocMeta, body: &str) -> Result<Self, serde_json::Error> {
        Ok(Self { meta, body: serde_json::from_str(body)? })
    }

    pub fn metadata(&self) -> &DocMeta {
        &self.meta
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.body.validate()
    }
}

/// Closed union over the two document variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Document {
    Message(Message),
    Character(Character),
}

impl Document {
    /// Decode a raw payload as the given variant.
    pub fn parse_body(kind: DocumentKind, raw: &[u8]) -> Result<Self, AppError> {
        Ok(match kind {
            DocumentKind::Message => Self::Message(Doc::parse_body(raw)?),
            DocumentKind::Character => Self::Character(Doc::parse_body(raw)?),
        })
    }

    /// Rebuild a stored document.
    pub fn from_stored(kind: DocumentKind, meta: DocMeta, body: &str) -> Result<Self, AppError> {
        let decoded = match kind {
            DocumentKind::Message => Doc::<MessageBody>::from_stored(meta, body).map(Self::Message),
            DocumentKind::Character => {
                Doc::<CharacterBody>::from_stored(meta, body).map(Self::Character)
            }
        };
        decoded.map_err(|e| AppError::Internal(format!("corrupt stored {} body: {}", kind, e)))
    }

    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::Message(_) => MessageBody::KIND,
            Self::Character(_) => CharacterBody::KIND,
        }
    }

    pub fn metadata(&self) -> &DocMeta {
        match self {
            Self::Message(m) => m.metadata(),
            Self::Character(c) => c.metadata(),
        }
    }

    pub fn metadata_mut(&mut self) -> &mut DocMeta {
        match self {
            Self::Message(m) => &mut m.meta,
            Self::Character(c) => &mut c.meta,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Message(m) => m.validate(),
            Self::Character(c) => c.validate(),
        }
    }

    /// Cross-document reference check against the room's current state.
    ///
    /// Must only run on documents that passed [`Document::validate`].
    pub async fn check_relations(
        &self,
        room_id: &str,
        store: &dyn DocumentRepository,
    ) -> Result<(), AppError> {
        match self {
            Self::Message(m) => m.body.check_relations(room_id, store).await,
            Self::Character(_) => Ok(()),
        }
    }

    /// JSON of the body alone, as persisted.
    pub fn body_json(&self) -> Result<String, AppError> {
        let encoded = match self {
            Self::Message(m) => serde_json::to_string(&m.body),
            Self::Character(c) => serde_json::to_string(&c.body),
        };
        encoded.map_err(|e| AppError::Internal(e.to_string()))
    }
}

/// Repository trait for room documents.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Find a character of a room by identity.
    async fn get_character(&self, room_id: &str, chara_id: &str) -> Result<Option<Character>, AppError>;

    /// Find the current revision of any document of a room.
    async fn get_document(
        &self,
        room_id: &str,
        kind: DocumentKind,
        id: &str,
    ) -> Result<Option<Document>, AppError>;

    /// All messages of a room, in insertion order.
    async fn list_messages(&self, room_id: &str) -> Result<Vec<Message>, AppError>;

    /// All characters of a room, in insertion order.
    async fn list_characters(&self, room_id: &str) -> Result<Vec<Character>, AppError>;

    /// Persist a new document with assigned metadata.
    async fn insert(&self, room_id: &str, doc: &Document) -> Result<(), AppError>;

    /// Replace the current revision of a document.
    ///
    /// Fails with `Conflict` unless the stored revision is still
    /// `previous_revision`.
    async fn update(&self, room_id: &str, doc: &Document, previous_revision: i64) -> Result<(), AppError>;

    /// Every stored revision of a document, oldest first.
    async fn history(&self, room_id: &str, kind: DocumentKind, id: &str) -> Result<Vec<Document>, AppError>;
}
