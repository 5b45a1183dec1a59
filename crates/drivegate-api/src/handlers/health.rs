use axum::{http::StatusCode, response::IntoResponse, Json};

/// Liveness probe - simple check that process is running
/// Always returns 200 if process can respond
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "alive"
        })),
    )
}

/// Health check. The provider is only reachable with live credentials, so this
/// reports process health and the configured environment.
pub async fn health_check(environment: String) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "healthy",
            "environment": environment,
        })),
    )
}
