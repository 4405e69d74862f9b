//! Message variant: body, validation rules and text rendering.
//!
//! Stored as a JSON body in the `documents` table with kind `msgs`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::character::Character;
use super::document::{Doc, DocumentBody, DocumentKind, DocumentRepository};
use super::validation::ValidationError;
use crate::shared::error::AppError;
use crate::shared::text::wrap_crlf;

/// Maximum message content length in characters.
pub const MAX_CONTENT_LENGTH: usize = 50_000;

/// Maximum image url length in characters.
pub const MAX_URL_LENGTH: usize = 1_000;

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://[-A-Za-z0-9+&@#/%?=~_|!:,.;]+$").expect("url pattern is a valid regex")
});

/// The closed set of message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// Scene narration
    Narrator,
    /// Spoken by a character of the room
    Chara,
    /// Out-of-character chatter
    Ooc,
    /// A linked image
    Image,
}

impl MessageType {
    /// Convert to the wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Narrator => "narrator",
            Self::Chara => "chara",
            Self::Ooc => "ooc",
            Self::Image => "image",
        }
    }
}

impl std::str::FromStr for MessageType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "narrator" => Ok(Self::Narrator),
            "chara" => Ok(Self::Chara),
            "ooc" => Ok(Self::Ooc),
            "image" => Ok(Self::Image),
            other => Err(ValidationError::InvalidType(other.to_string())),
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Message body as posted by clients.
///
/// `kind` stays a plain string so that decoding never fails on an unknown
/// type; that is a validation concern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageBody {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub content: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,

    #[serde(rename = "charaId", skip_serializing_if = "String::is_empty")]
    pub chara_id: String,
}

/// A message together with its metadata.
pub type Message = Doc<MessageBody>;

impl MessageBody {
    /// Typed view of `kind`.
    pub fn message_type(&self) -> Result<MessageType, ValidationError> {
        self.kind.parse()
    }

    fn validate_image(&self) -> Result<(), ValidationError> {
        if !self.content.is_empty() {
            return Err(ValidationError::ImageHasContent);
        }
        if !self.chara_id.is_empty() {
            return Err(ValidationError::ImageHasCharaId);
        }
        let url_length = self.url.chars().count();
        if url_length > MAX_URL_LENGTH {
            return Err(ValidationError::UrlTooLong(url_length));
        }
        if !URL_PATTERN.is_match(&self.url) {
            return Err(ValidationError::UrlInvalid);
        }
        Ok(())
    }

    fn validate_text(&self, message_type: MessageType) -> Result<(), ValidationError> {
        if !self.url.is_empty() {
            return Err(ValidationError::NonImageHasUrl);
        }
        if self.content.is_empty() {
            return Err(ValidationError::ContentEmpty);
        }
        let content_length = self.content.chars().count();
        if content_length > MAX_CONTENT_LENGTH {
            return Err(ValidationError::ContentTooLong(content_length));
        }
        match message_type {
            MessageType::Chara if self.chara_id.is_empty() => Err(ValidationError::CharaIdEmpty),
            MessageType::Narrator | MessageType::Ooc if !self.chara_id.is_empty() => {
                Err(ValidationError::NonCharaHasCharaId)
            }
            _ => Ok(()),
        }
    }

    /// Referential check: a `chara` message must point at a character of
    /// the same room. Other types have no references.
    pub async fn check_relations(
        &self,
        room_id: &str,
        store: &dyn DocumentRepository,
    ) -> Result<(), AppError> {
        if self.message_type()? != MessageType::Chara {
            return Ok(());
        }

        match store.get_character(room_id, &self.chara_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::Relation(format!(
                "Msg with invalid chara id: {}",
                self.chara_id
            ))),
        }
    }
}

impl DocumentBody for MessageBody {
    const KIND: DocumentKind = DocumentKind::Message;

    fn validate(&self) -> Result<(), ValidationError> {
        match self.message_type()? {
            MessageType::Image => self.validate_image(),
            text => self.validate_text(text),
        }
    }
}

impl Message {
    /// Whether this is out-of-character chatter.
    pub fn is_ooc(&self) -> bool {
        self.body.kind == MessageType::Ooc.as_str()
    }

    /// Render as plain transcript text with CRLF line endings.
    ///
    /// `chara` is the character referenced by a `chara` message. Only ever
    /// called on validated messages; an unknown type here is a bug.
    pub fn to_txt(&self, chara: Option<&Character>) -> String {
        let body = &self.body;
        match body.message_type() {
            Ok(MessageType::Chara) => {
                let name = chara
                    .map(|c| c.body.name.to_uppercase())
                    .unwrap_or_else(|| "UNKNOWN".to_string());
                format!("{}:\r\n  {}", name, wrap_crlf(&body.content, 70, "  "))
            }
            Ok(MessageType::Ooc) => wrap_crlf(&format!("(( OOC: {} ))", body.content), 72, ""),
            Ok(MessageType::Narrator) => wrap_crlf(&body.content, 72, ""),
            Ok(MessageType::Image) => format!("--- IMAGE ---\r\n{}\r\n-------------", body.url),
            Err(e) => unreachable!("render of unvalidated message: {}", e),
        }
    }
}
