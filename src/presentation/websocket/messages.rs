//! Chat Stream Message Types
//!
//! Every frame is an envelope `{type, data}`; `data` is scoped to `type`.

use serde::{Deserialize, Serialize};

use crate::application::dto::RoomSnapshotResponse;
use crate::domain::Document;

/// Frame type of the initial room state
pub const INIT: &str = "init";

/// Outgoing chat stream frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatStreamMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: serde_json::Value,
}

impl ChatStreamMessage {
    /// First frame of every stream: the whole room.
    pub fn init(snapshot: &RoomSnapshotResponse) -> Result<Self, serde_json::Error> {
        Ok(Self { kind: INIT.to_string(), data: serde_json::to_value(snapshot)? })
    }

    /// A created or revised document, typed by its collection name.
    pub fn document(doc: &Document) -> Result<Self, serde_json::Error> {
        Ok(Self { kind: doc.kind().as_str().to_string(), data: serde_json::to_value(doc)? })
    }
}
