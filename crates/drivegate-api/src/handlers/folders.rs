use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use drivegate_core::models::FolderListResponse;
use std::sync::Arc;

/// List destination folders directly under the configured root
#[utoipa::path(
    get,
    path = "/folders",
    tag = "folders",
    responses(
        (status = 200, description = "Child folders of the configured root", body = FolderListResponse),
        (status = 500, description = "Provider or configuration failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "list_folders"))]
pub async fn list_folders(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let folders = state
        .provider
        .list_folders(&state.config.root_folder_id)
        .await?;

    tracing::debug!(count = folders.len(), "Listed destination folders");

    Ok(Json(FolderListResponse { folders }))
}
