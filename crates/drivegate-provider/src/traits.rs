//! Provider abstraction trait
//!
//! The gateway's broker works against this trait so tests can substitute a
//! recording mock for the real Drive backend.

use async_trait::async_trait;
use drivegate_core::models::{FileProbe, FolderDescriptor};
use thiserror::Error;

/// Provider operation errors
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Provider rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Provider protocol error: {0}")]
    Protocol(String),

    #[error("Network failure: {0}")]
    Network(String),
}

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Storage provider abstraction.
///
/// One implementor per provider; the broker never sees provider wire formats,
/// only these typed results.
#[async_trait]
pub trait DriveProvider: Send + Sync {
    /// List non-trashed child folders of `parent_id` as `{id, name}` pairs.
    async fn list_folders(&self, parent_id: &str) -> ProviderResult<Vec<FolderDescriptor>>;

    /// Create a folder named `name` under `parent_id`.
    async fn create_folder(&self, name: &str, parent_id: &str)
        -> ProviderResult<FolderDescriptor>;

    /// Initiate a resumable upload session for a file parented under
    /// `parent_id`. Returns the single-use session URL.
    async fn initiate_resumable_session(
        &self,
        name: &str,
        mime_type: &str,
        parent_id: &str,
    ) -> ProviderResult<String>;

    /// Probe a file/folder by id (destination-validation path only).
    async fn get_file(&self, file_id: &str) -> ProviderResult<FileProbe>;
}
