//! Batch coordinator: drives a queue of uploads strictly one at a time.
//!
//! Each task gets its own brokered session and its own PUT; one failure never
//! aborts the rest of the batch. When the batch targets a new folder, the
//! folder is created by the first brokered session and its id is reused for
//! every later task, so a batch creates at most one folder.

use crate::queue::{aggregate_status, BatchDestination, BatchStatus, TaskState, UploadTask};
use crate::transfer::{ProgressFn, TransferError};
use crate::ApiClient;
use anyhow::Result;
use async_trait::async_trait;
use drivegate_core::models::{SessionRequest, UploadSessionResponse};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Source of brokered upload sessions.
#[async_trait]
pub trait SessionSource: Send + Sync {
    async fn create_session(&self, request: &SessionRequest) -> Result<UploadSessionResponse>;
}

#[async_trait]
impl SessionSource for ApiClient {
    async fn create_session(&self, request: &SessionRequest) -> Result<UploadSessionResponse> {
        self.create_upload_session(request).await
    }
}

/// Byte mover for one brokered session.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn transfer(
        &self,
        upload_url: &str,
        path: &Path,
        progress: ProgressFn,
    ) -> Result<(), TransferError>;
}

#[async_trait]
impl Transport for crate::TransferEngine {
    async fn transfer(
        &self,
        upload_url: &str,
        path: &Path,
        progress: ProgressFn,
    ) -> Result<(), TransferError> {
        self.upload_file(upload_url, path, Some(progress)).await
    }
}

struct BatchState {
    tasks: Vec<UploadTask>,
    destination: BatchDestination,
    /// Folder id returned by the first brokered session of this batch
    resolved_folder_id: Option<String>,
}

pub struct BatchCoordinator {
    sessions: Arc<dyn SessionSource>,
    transport: Arc<dyn Transport>,
    state: Arc<Mutex<BatchState>>,
    in_flight: AtomicBool,
}

impl BatchCoordinator {
    pub fn new(
        sessions: Arc<dyn SessionSource>,
        transport: Arc<dyn Transport>,
        destination: BatchDestination,
    ) -> Self {
        Self {
            sessions,
            transport,
            state: Arc::new(Mutex::new(BatchState {
                tasks: Vec::new(),
                destination,
                resolved_folder_id: None,
            })),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn add_task(&self, task: UploadTask) {
        self.state.lock().unwrap().tasks.push(task);
    }

    /// Snapshot of the queue for display.
    pub fn tasks(&self) -> Vec<UploadTask> {
        self.state.lock().unwrap().tasks.clone()
    }

    pub fn status(&self) -> BatchStatus {
        aggregate_status(&self.state.lock().unwrap().tasks)
    }

    /// Run the batch to completion, one task at a time, in queue order.
    ///
    /// A second call while a run is in flight is a no-op and returns the
    /// current status. Tasks already in `Success` are skipped; `Error` tasks
    /// are retried with a fresh session.
    pub async fn run(&self) -> BatchStatus {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            tracing::debug!("Batch already running; ignoring start request");
            return self.status();
        }

        // Clears the flag even when this future is dropped mid-transfer, so a
        // cancelled run never wedges the coordinator.
        struct ClearOnDrop<'a>(&'a AtomicBool);
        impl Drop for ClearOnDrop<'_> {
            fn drop(&mut self) {
                self.0.store(false, Ordering::SeqCst);
            }
        }
        let _in_flight = ClearOnDrop(&self.in_flight);

        let count = self.state.lock().unwrap().tasks.len();
        for index in 0..count {
            let task = {
                let mut state = self.state.lock().unwrap();
                let task = &mut state.tasks[index];
                if task.state == TaskState::Success {
                    continue;
                }
                task.state = TaskState::Uploading;
                task.progress = 0;
                task.error = None;
                task.clone()
            };

            if let Err(e) = self.upload_one(index, &task).await {
                tracing::warn!(file_name = %task.file_name, error = %e, "Task failed");
                let mut state = self.state.lock().unwrap();
                state.tasks[index].state = TaskState::Error;
                state.tasks[index].error = Some(e);
            }
        }

        self.status()
    }

    async fn upload_one(&self, index: usize, task: &UploadTask) -> std::result::Result<(), String> {
        let request = self.session_request_for(task);

        let grant = self
            .sessions
            .create_session(&request)
            .await
            .map_err(|e| e.to_string())?;

        if let Some(folder_id) = &grant.folder_id {
            let mut state = self.state.lock().unwrap();
            if state.resolved_folder_id.is_none() {
                state.resolved_folder_id = Some(folder_id.clone());
            }
        }

        let progress_state = self.state.clone();
        let progress: ProgressFn = Arc::new(move |pct| {
            let mut state = progress_state.lock().unwrap();
            if let Some(t) = state.tasks.get_mut(index) {
                t.progress = pct;
            }
        });

        self.transport
            .transfer(&grant.upload_url, &task.path, progress)
            .await
            .map_err(|e| e.to_string())?;

        let mut state = self.state.lock().unwrap();
        state.tasks[index].state = TaskState::Success;
        state.tasks[index].progress = 100;
        Ok(())
    }

    /// Build the session request for one task. Once a folder id has been
    /// resolved for this batch it replaces both destination fields.
    fn session_request_for(&self, task: &UploadTask) -> SessionRequest {
        let state = self.state.lock().unwrap();
        let (folder_id, new_folder_name) = match &state.resolved_folder_id {
            Some(id) => (Some(id.clone()), None),
            None => (
                state.destination.folder_id.clone(),
                state.destination.new_folder_name.clone(),
            ),
        };

        SessionRequest {
            file_name: Some(task.file_name.clone()),
            file_type: Some(task.content_type.clone()),
            file_size: Some(task.size),
            folder_id,
            new_folder_name,
        }
    }
}
