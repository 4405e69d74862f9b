//! User Handlers

use axum::{extract::State, http::StatusCode, Json};

use crate::application::dto::UserTokenResponse;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Issue a new anonymous user and its token
pub async fn create_user(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<UserTokenResponse>), AppError> {
    let issued = state.auth.issue_user().await?;
    Ok((
        StatusCode::CREATED,
        Json(UserTokenResponse { userid: issued.userid, token: issued.token }),
    ))
}
