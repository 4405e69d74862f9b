//! Request DTOs
//!
//! Data structures for API request bodies and query strings. Document
//! payloads are not listed here; they are decoded by the domain model.

use serde::Deserialize;
use validator::Validate;

/// Create room request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRoomRequest {
    #[validate(length(min = 1, max = 30, message = "Title must be 1-30 characters"))]
    pub title: String,

    #[validate(length(max = 255, message = "Description must be at most 255 characters"))]
    pub desc: Option<String>,
}

/// Query of the text transcript download
#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    #[serde(rename = "includeOOC", default = "default_include_ooc")]
    pub include_ooc: bool,
}

fn default_include_ooc() -> bool {
    true
}

impl Default for DownloadQuery {
    fn default() -> Self {
        Self { include_ooc: true }
    }
}
