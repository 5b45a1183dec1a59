use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;
use drivegate_core::models::{SessionDebug, SessionRequest, UploadSessionResponse};
use drivegate_core::AppError;
use std::sync::Arc;
use validator::Validate;

/// Broker a single-use resumable upload session
#[utoipa::path(
    post,
    path = "/upload",
    tag = "uploads",
    request_body = SessionRequest,
    responses(
        (status = 200, description = "Resumable session granted", body = UploadSessionResponse),
        (status = 500, description = "Invalid request, destination failure, or provider failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, request),
    fields(
        file_name = ?request.file_name,
        folder_id = ?request.folder_id,
        new_folder_name = ?request.new_folder_name,
        operation = "create_upload_session"
    )
)]
pub async fn create_upload_session(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<SessionRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request
        .validate()
        .map_err(|e| AppError::InvalidRequest(e.to_string()))?;

    let grant = state.broker.create_session(&request).await?;

    // The debug block is for development panels only; production callers get
    // the bare grant.
    let debug = if state.is_production {
        None
    } else {
        Some(SessionDebug {
            folder_id: grant.folder_id.clone(),
            file_type: request.content_type().to_string(),
            session_created_at: Utc::now(),
        })
    };

    Ok(Json(UploadSessionResponse {
        upload_url: grant.upload_url,
        folder_id: Some(grant.folder_id),
        debug,
    }))
}
