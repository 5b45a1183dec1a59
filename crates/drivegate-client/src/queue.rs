//! Upload task queue model.
//!
//! Tasks carry their own lifecycle state; the aggregate batch status is a pure
//! function of the task states so any UI can derive it from a snapshot.

use std::path::PathBuf;
use uuid::Uuid;

/// Lifecycle of a single file upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Queued, not yet attempted
    Idle,
    /// Transfer in flight
    Uploading,
    /// Terminal: the provider accepted the file
    Success,
    /// Terminal for this run; re-running the batch retries it
    Error,
}

/// One file in a batch.
#[derive(Debug, Clone)]
pub struct UploadTask {
    pub id: Uuid,
    pub file_name: String,
    pub path: PathBuf,
    pub size: u64,
    pub content_type: String,
    pub state: TaskState,
    /// Whole percent, 0..=100
    pub progress: u8,
    pub error: Option<String>,
}

impl UploadTask {
    pub fn new(path: PathBuf, size: u64, content_type: String) -> Self {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.bin")
            .to_string();
        Self {
            id: Uuid::new_v4(),
            file_name,
            path,
            size,
            content_type,
            state: TaskState::Idle,
            progress: 0,
            error: None,
        }
    }
}

/// Destination shared by every task in a batch.
#[derive(Debug, Clone, Default)]
pub struct BatchDestination {
    /// Existing folder id; ignored when `new_folder_name` is set
    pub folder_id: Option<String>,
    /// Folder to create under the gateway's root on first use
    pub new_folder_name: Option<String>,
}

/// Aggregate batch status, derived from task states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    Idle,
    Uploading,
    Success,
    Error,
}

/// Derive the batch status: any in-flight task dominates, then any failure,
/// then all-success; an empty or untouched batch is idle.
pub fn aggregate_status(tasks: &[UploadTask]) -> BatchStatus {
    if tasks.iter().any(|t| t.state == TaskState::Uploading) {
        return BatchStatus::Uploading;
    }
    if tasks.iter().any(|t| t.state == TaskState::Error) {
        return BatchStatus::Error;
    }
    if !tasks.is_empty() && tasks.iter().all(|t| t.state == TaskState::Success) {
        return BatchStatus::Success;
    }
    BatchStatus::Idle
}
