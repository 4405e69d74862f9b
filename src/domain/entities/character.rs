//! Character variant.
//!
//! Stored as a JSON body in the `documents` table with kind `charas`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::document::{Doc, DocumentBody, DocumentKind};
use super::validation::ValidationError;

/// Maximum character name length in characters.
pub const MAX_NAME_LENGTH: usize = 30;

static COLOR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9a-f]{6}$").expect("color pattern is a valid regex"));

/// Character body as posted by clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterBody {
    /// Display name (1-30 characters)
    pub name: String,

    /// Lowercase `#rrggbb` color
    pub color: String,
}

/// A character together with its metadata.
pub type Character = Doc<CharacterBody>;

impl DocumentBody for CharacterBody {
    const KIND: DocumentKind = DocumentKind::Character;

    fn validate(&self) -> Result<(), ValidationError> {
        let name_length = self.name.chars().count();
        if name_length == 0 {
            return Err(ValidationError::NameEmpty);
        }
        if name_length > MAX_NAME_LENGTH {
            return Err(ValidationError::NameTooLong(name_length));
        }
        if !COLOR_PATTERN.is_match(&self.color) {
            return Err(ValidationError::ColorInvalid);
        }
        Ok(())
    }
}
