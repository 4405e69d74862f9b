//! Export Service
//!
//! Flat renderings of a room: newline-separated JSON blocks and a plain
//! text transcript.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Character, CharacterBody, Room};
use crate::shared::error::AppError;
use crate::shared::text::wrap_crlf;

#[derive(Serialize)]
struct ExportHeader<'a> {
    title: &'a str,
    charas: Vec<ExportChara<'a>>,
}

#[derive(Serialize)]
struct ExportChara<'a> {
    timestamp: DateTime<Utc>,
    #[serde(flatten)]
    body: &'a CharacterBody,
}

#[derive(Serialize)]
struct ExportMessage<'a> {
    timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    kind: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    content: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    url: &'a str,
    /// Position of the character in the header's `charas`
    #[serde(rename = "charaId", skip_serializing_if = "Option::is_none")]
    chara_id: Option<usize>,
}

/// JSON export: a header block with the title and characters, then one block
/// per message. Character references become positions in the header list.
pub fn export_json(room: &Room) -> Result<String, AppError> {
    let positions: HashMap<&str, usize> = room
        .charas
        .iter()
        .enumerate()
        .map(|(i, c)| (c.meta.id.as_str(), i))
        .collect();

    let header = ExportHeader {
        title: &room.info.title,
        charas: room
            .charas
            .iter()
            .map(|c| ExportChara { timestamp: c.meta.timestamp, body: &c.body })
            .collect(),
    };

    let mut out = encode(&header)?;
    for msg in &room.msgs {
        let block = ExportMessage {
            timestamp: msg.meta.timestamp,
            kind: &msg.body.kind,
            content: &msg.body.content,
            url: &msg.body.url,
            chara_id: positions.get(msg.body.chara_id.as_str()).copied(),
        };
        out.push('\n');
        out.push_str(&encode(&block)?);
    }
    out.push('\n');
    Ok(out)
}

fn encode<T: Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string(value).map_err(|e| AppError::Internal(format!("export encoding: {}", e)))
}

/// Plain text transcript with CRLF line endings.
pub fn export_txt(room: &Room, include_ooc: bool) -> String {
    let charas: HashMap<&str, &Character> =
        room.charas.iter().map(|c| (c.meta.id.as_str(), c)).collect();

    let mut blocks = vec![room.info.title.clone()];
    if let Some(desc) = room.info.desc.as_deref().filter(|d| !d.is_empty()) {
        blocks.push(wrap_crlf(desc, 72, ""));
    }
    blocks.push("-".repeat(72));

    blocks.extend(
        room.msgs
            .iter()
            .filter(|m| include_ooc || !m.is_ooc())
            .map(|m| m.to_txt(charas.get(m.body.chara_id.as_str()).copied())),
    );

    let mut out = blocks.join("\r\n\r\n");
    out.push_str("\r\n");
    out
}
