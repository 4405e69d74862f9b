//! Export Handlers

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};

use crate::application::dto::DownloadQuery;
use crate::application::services::{export_json, export_txt};
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Newline-separated JSON blocks
pub async fn export_room(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let slug_info = state.rooms.resolve(&slug).await?;
    let room = state.rooms.snapshot(&slug_info.rpid).await?;
    let body = export_json(&room)?;

    Ok(([(header::CONTENT_TYPE, "application/x-ndjson; charset=utf-8")], body))
}

/// Plain text transcript
pub async fn download_txt(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<DownloadQuery>,
) -> Result<impl IntoResponse, AppError> {
    let slug_info = state.rooms.resolve(&slug).await?;
    let room = state.rooms.snapshot(&slug_info.rpid).await?;
    let body = export_txt(&room, query.include_ooc);

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"transcript.txt\""),
        ],
        body,
    ))
}
