//! Room entity, slugs and repository trait.
//!
//! Maps to the `rooms` and `slugs` tables.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::character::Character;
use super::message::Message;
use crate::shared::error::AppError;

/// Room summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomInfo {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,

    /// Slug that grants read-only access
    #[serde(rename = "readCode")]
    pub read_code: String,
}

/// Access level granted by a slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    /// Read and write
    Normal,
    /// Read only
    Read,
}

impl Access {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Read => "read",
        }
    }
}

impl std::str::FromStr for Access {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Self::Normal),
            "read" => Ok(Self::Read),
            other => Err(AppError::Internal(format!("unknown slug access '{}'", other))),
        }
    }
}

/// What a room URL slug resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlugInfo {
    pub rpid: String,
    pub access: Access,
}

impl SlugInfo {
    pub fn can_write(&self) -> bool {
        self.access == Access::Normal
    }
}

/// Full state of a room: ordered messages and its characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub rpid: String,
    pub info: RoomInfo,
    pub msgs: Vec<Message>,
    pub charas: Vec<Character>,
}

impl Room {
    /// Look up a character by identity.
    pub fn character(&self, id: &str) -> Option<&Character> {
        self.charas.iter().find(|c| c.meta.id == id)
    }
}

/// Repository trait for rooms and their slugs.
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Create a room with its write slug and its read slug (`info.read_code`).
    async fn create(&self, rpid: &str, info: &RoomInfo, write_slug: &str) -> Result<(), AppError>;

    /// Resolve a slug.
    async fn find_slug(&self, slug: &str) -> Result<Option<SlugInfo>, AppError>;

    /// Fetch a room summary.
    async fn get_info(&self, rpid: &str) -> Result<Option<RoomInfo>, AppError>;

    /// Number of rooms in the store.
    async fn count(&self) -> Result<i64, AppError>;
}
