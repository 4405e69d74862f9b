//! Message and Character Handlers
//!
//! Bodies are taken as raw bytes; decoding belongs to the document model so
//! malformed payloads surface as decode errors with the usual error body.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use crate::domain::{Document, DocumentKind};
use crate::presentation::middleware::AuthUser;
use crate::presentation::websocket::ChatStreamMessage;
use crate::shared::error::AppError;
use crate::startup::AppState;

async fn create(
    state: &AppState,
    slug: &str,
    kind: DocumentKind,
    user: &AuthUser,
    body: &[u8],
) -> Result<(StatusCode, Json<Document>), AppError> {
    let slug_info = state.rooms.resolve_writable(slug).await?;
    let doc = state.documents.create(&slug_info.rpid, kind, body, &user.userid).await?;
    broadcast(state, &slug_info.rpid, &doc);
    Ok((StatusCode::CREATED, Json(doc)))
}

async fn edit(
    state: &AppState,
    slug: &str,
    kind: DocumentKind,
    id: &str,
    user: &AuthUser,
    body: &[u8],
) -> Result<Json<Document>, AppError> {
    let slug_info = state.rooms.resolve_writable(slug).await?;
    let doc = state.documents.edit(&slug_info.rpid, kind, id, body, &user.userid).await?;
    broadcast(state, &slug_info.rpid, &doc);
    Ok(Json(doc))
}

fn broadcast(state: &AppState, rpid: &str, doc: &Document) {
    match ChatStreamMessage::document(doc) {
        Ok(frame) => {
            state.hub.publish(rpid, frame);
        }
        Err(e) => tracing::error!(rpid = %rpid, error = %e, "Failed to encode chat frame"),
    }
}

/// Post a message
pub async fn create_message(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Extension(user): Extension<AuthUser>,
    body: Bytes,
) -> Result<(StatusCode, Json<Document>), AppError> {
    create(&state, &slug, DocumentKind::Message, &user, &body).await
}

/// Edit a message
pub async fn edit_message(
    State(state): State<AppState>,
    Path((slug, id)): Path<(String, String)>,
    Extension(user): Extension<AuthUser>,
    body: Bytes,
) -> Result<Json<Document>, AppError> {
    edit(&state, &slug, DocumentKind::Message, &id, &user, &body).await
}

/// All revisions of a message
pub async fn message_history(
    State(state): State<AppState>,
    Path((slug, id)): Path<(String, String)>,
) -> Result<Json<Vec<Document>>, AppError> {
    let slug_info = state.rooms.resolve(&slug).await?;
    let revisions = state.documents.history(&slug_info.rpid, DocumentKind::Message, &id).await?;
    Ok(Json(revisions))
}

/// Add a character
pub async fn create_character(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Extension(user): Extension<AuthUser>,
    body: Bytes,
) -> Result<(StatusCode, Json<Document>), AppError> {
    create(&state, &slug, DocumentKind::Character, &user, &body).await
}

/// Edit a character
pub async fn edit_character(
    State(state): State<AppState>,
    Path((slug, id)): Path<(String, String)>,
    Extension(user): Extension<AuthUser>,
    body: Bytes,
) -> Result<Json<Document>, AppError> {
    edit(&state, &slug, DocumentKind::Character, &id, &user, &body).await
}
