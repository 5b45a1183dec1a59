//! Transfer engine: streams file bytes to a brokered session URL.
//!
//! The gateway never sees these bytes. One PUT per file, body streamed from
//! disk, progress reported as whole percent steps. The session URL is
//! single-use; a failed transfer needs a fresh session.

use futures::StreamExt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

/// Progress callback, invoked with whole percents in ascending order.
pub type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

/// The declared MIME type already travelled in the session request; the byte
/// transfer itself is always an opaque stream.
const TRANSFER_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// The provider answered with a terminal status.
    #[error("Upload rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// No status was observed; the connection failed mid-flight.
    #[error("Upload failed: {0}")]
    Network(String),

    #[error("Failed to read local file: {0}")]
    Io(#[from] std::io::Error),
}

/// A terminal provider status is a success anywhere in the 2xx/3xx range.
pub fn is_success_status(status: u16) -> bool {
    (200..400).contains(&status)
}

/// Whole-percent progress for `sent` of `total` bytes. Zero-byte files jump
/// straight to 100.
pub fn percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    ((sent.saturating_mul(100)) / total).min(100) as u8
}

/// A disconnect after every byte was handed to the transport is treated as a
/// completed upload: the provider finalizes the file even when the response
/// never reaches us.
pub fn completed_despite_disconnect(sent: u64, total: u64) -> bool {
    total > 0 && sent >= total
}

pub struct TransferEngine {
    http: reqwest::Client,
}

impl Default for TransferEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferEngine {
    pub fn new() -> Self {
        // No overall timeout: large files legitimately take a long time.
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Stream `path` to `upload_url` as a single PUT.
    pub async fn upload_file(
        &self,
        upload_url: &str,
        path: &Path,
        progress: Option<ProgressFn>,
    ) -> Result<(), TransferError> {
        let file = tokio::fs::File::open(path).await?;
        let total = file.metadata().await?.len();

        let sent = Arc::new(AtomicU64::new(0));
        let sent_for_stream = sent.clone();
        let progress_for_stream = progress.clone();

        let stream = ReaderStream::new(file).map(move |chunk| {
            if let Ok(bytes) = &chunk {
                let so_far = sent_for_stream.fetch_add(bytes.len() as u64, Ordering::SeqCst)
                    + bytes.len() as u64;
                if let Some(cb) = &progress_for_stream {
                    cb(percent(so_far, total));
                }
            }
            chunk
        });

        let response = self
            .http
            .put(upload_url)
            .header("Content-Type", TRANSFER_CONTENT_TYPE)
            .header("Content-Length", total)
            .body(reqwest::Body::wrap_stream(stream))
            .send()
            .await;

        match response {
            Ok(resp) => {
                let status = resp.status().as_u16();
                if is_success_status(status) {
                    if let Some(cb) = &progress {
                        cb(100);
                    }
                    tracing::debug!(status, bytes = total, "Transfer completed");
                    Ok(())
                } else {
                    // The provider's response body is the only diagnostic the
                    // caller will ever see for this session.
                    let body = resp.text().await.unwrap_or_default();
                    Err(TransferError::Rejected { status, body })
                }
            }
            Err(e) => {
                let delivered = sent.load(Ordering::SeqCst);
                if completed_despite_disconnect(delivered, total) {
                    // Response lost after the last byte; count it as done.
                    tracing::warn!(
                        bytes = total,
                        "Connection dropped after full delivery; treating as success"
                    );
                    if let Some(cb) = &progress {
                        cb(100);
                    }
                    Ok(())
                } else {
                    Err(TransferError::Network(e.to_string()))
                }
            }
        }
    }
}
