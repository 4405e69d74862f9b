//! # Domain Entities
//!
//! Core domain entities of the role-play server.
//!
//! ## Documents
//!
//! - **Message**: one entry of a room's transcript (narrator, chara, ooc, image)
//! - **Character**: a named, colored speaker of a room
//!
//! Both share the [`DocMeta`] envelope and are unified by [`Document`].
//!
//! ## Rooms
//!
//! - **Room**: ordered messages plus a character set, reached through slugs
//!
//! ## Repository Traits
//!
//! Data access contracts implemented in the infrastructure layer.

mod character;
mod document;
mod message;
mod meta;
mod room;
mod secret;
mod validation;

pub use character::{Character, CharacterBody, MAX_NAME_LENGTH};
pub use document::{Doc, Document, DocumentBody, DocumentKind, DocumentRepository};
pub use message::{Message, MessageBody, MessageType, MAX_CONTENT_LENGTH, MAX_URL_LENGTH};
pub use meta::DocMeta;
pub use room::{Access, Room, RoomInfo, RoomRepository, SlugInfo};
pub use secret::SecretRepository;
pub use validation::ValidationError;

#[cfg(test)]
pub use document::MockDocumentRepository;
#[cfg(test)]
pub use secret::MockSecretRepository;
