//! HTTP client for the Drivegate API.
//!
//! Provides a minimal client with generic GET/POST helpers and the two domain
//! methods (folder listing, session brokering), plus the transfer engine that
//! streams file bytes straight to the provider and the batch coordinator that
//! drives multi-file uploads. The CLI uses all three directly.

pub mod batch;
pub mod queue;
pub mod transfer;

use anyhow::{Context, Result};
use drivegate_core::models::{FolderListResponse, SessionRequest, UploadSessionResponse};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

pub use batch::{BatchCoordinator, SessionSource, Transport};
pub use queue::{aggregate_status, BatchDestination, BatchStatus, TaskState, UploadTask};
pub use transfer::{TransferEngine, TransferError};

/// HTTP client for the Drivegate gateway.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create client from environment: DRIVEGATE_API_URL (or API_URL).
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("DRIVEGATE_API_URL")
            .or_else(|_| std::env::var("API_URL"))
            .unwrap_or_else(|_| "http://localhost:4000".to_string());

        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET request. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.build_url(path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!(
                "API request failed with status {}: {}",
                status,
                error_text
            ));
        }

        let body: T = response
            .json()
            .await
            .context("Failed to parse response as JSON")?;

        Ok(body)
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.build_url(path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!(
                "API request failed with status {}: {}",
                status,
                error_text
            ));
        }

        let body: T = response
            .json()
            .await
            .context("Failed to parse response as JSON")?;

        Ok(body)
    }

    /// List destination folders under the gateway's configured root.
    pub async fn list_folders(&self) -> Result<FolderListResponse> {
        self.get("/folders").await
    }

    /// Broker a resumable upload session for one file.
    pub async fn create_upload_session(
        &self,
        request: &SessionRequest,
    ) -> Result<UploadSessionResponse> {
        self.post_json("/upload", request).await
    }

    /// Raw client for custom requests.
    pub fn client(&self) -> &Client {
        &self.client
    }
}
