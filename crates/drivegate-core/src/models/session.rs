use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Request to broker a resumable upload session.
///
/// All fields are optional on the wire; the broker rejects requests without a
/// `fileName` before touching the provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    /// Declared file name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 255, message = "File name must be at most 255 characters"))]
    pub file_name: Option<String>,
    /// Declared MIME type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    /// Declared size in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    /// Existing destination folder id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    /// Name of a folder to create under the configured root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 255, message = "Folder name must be at most 255 characters"))]
    pub new_folder_name: Option<String>,
}

impl SessionRequest {
    /// Declared content type, falling back to an opaque octet stream.
    pub fn content_type(&self) -> &str {
        self.file_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or("application/octet-stream")
    }
}

/// A brokered single-use resumable upload session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionGrant {
    /// Single-use resumable upload URL (the capability itself)
    pub upload_url: String,
    /// Folder id the session was parented under
    pub folder_id: String,
}

/// Wire response of `POST /upload`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadSessionResponse {
    pub upload_url: String,
    /// Resolved destination folder id (lets a batch reuse a freshly created folder)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<SessionDebug>,
}

/// Diagnostic block echoed back to the caller's debug panel.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionDebug {
    pub folder_id: String,
    pub file_type: String,
    pub session_created_at: DateTime<Utc>,
}

/// Resolved destination strategy for one session request.
///
/// Exactly one strategy is active per request: a non-empty new-folder name wins
/// over an explicit folder id, which wins over the implicit root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Create a folder with this name under the configured root and use its id
    NewFolder(String),
    /// Use the given folder id as-is
    Existing(String),
    /// Use the configured root folder id
    Root,
}

impl Destination {
    /// Apply the precedence rule. Inputs are trimmed; empty-after-trim counts
    /// as absent.
    pub fn resolve(new_folder_name: Option<&str>, folder_id: Option<&str>) -> Self {
        if let Some(name) = new_folder_name.map(str::trim).filter(|n| !n.is_empty()) {
            return Destination::NewFolder(name.to_string());
        }
        if let Some(id) = folder_id.map(str::trim).filter(|id| !id.is_empty()) {
            return Destination::Existing(id.to_string());
        }
        Destination::Root
    }
}
