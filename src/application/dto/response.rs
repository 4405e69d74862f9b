//! Response DTOs
//!
//! Data structures for API response bodies.

use serde::Serialize;

use crate::domain::{Character, Message, Room};

/// Issued anonymous user
#[derive(Debug, Serialize)]
pub struct UserTokenResponse {
    pub userid: String,
    pub token: String,
}

/// Newly created room and the slugs that reach it
#[derive(Debug, Serialize)]
pub struct RoomCreatedResponse {
    #[serde(rename = "rpCode")]
    pub rp_code: String,

    #[serde(rename = "readCode")]
    pub read_code: String,
}

/// Room state as seen through a slug
#[derive(Debug, Clone, Serialize)]
pub struct RoomSnapshotResponse {
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,

    #[serde(rename = "readCode")]
    pub read_code: String,

    /// Whether the slug used grants read access only
    #[serde(rename = "readOnly")]
    pub read_only: bool,

    pub msgs: Vec<Message>,
    pub charas: Vec<Character>,
}

impl RoomSnapshotResponse {
    pub fn new(room: Room, read_only: bool) -> Self {
        Self {
            title: room.info.title,
            desc: room.info.desc,
            read_code: room.info.read_code,
            read_only,
            msgs: room.msgs,
            charas: room.charas,
        }
    }
}
