//! Google Drive v3 backend.
//!
//! Loosely-typed Drive JSON is deserialized into explicit structs at this
//! boundary; the rest of the system only sees `FolderDescriptor`/`FileProbe`.

use crate::auth::TokenSource;
use crate::traits::{DriveProvider, ProviderError, ProviderResult};
use async_trait::async_trait;
use drivegate_core::config::GoogleCredentials;
use drivegate_core::models::{FileProbe, FolderDescriptor};
use serde::Deserialize;
use std::time::Duration;

const API_BASE: &str = "https://www.googleapis.com/drive/v3";
const RESUMABLE_INIT_URL: &str =
    "https://www.googleapis.com/upload/drive/v3/files?uploadType=resumable";
const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";
const HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct DriveFile {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    trashed: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

/// Drive v3 REST client.
pub struct GoogleDrive {
    http: reqwest::Client,
    tokens: TokenSource,
}

impl GoogleDrive {
    pub fn new(credentials: GoogleCredentials) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| ProviderError::Network(format!("Failed to create HTTP client: {}", e)))?;

        let tokens = TokenSource::new(http.clone(), credentials);
        Ok(Self { http, tokens })
    }

    async fn bearer(&self) -> ProviderResult<String> {
        let token = self.tokens.access_token().await?;
        Ok(format!("Bearer {}", token))
    }
}

/// Drive search query for non-trashed child folders of `parent_id`.
fn folder_query(parent_id: &str) -> String {
    format!(
        "'{}' in parents and mimeType = '{}' and trashed = false",
        parent_id, FOLDER_MIME_TYPE
    )
}

/// Drop entries without an id; render missing names as "Untitled".
fn into_descriptors(list: DriveFileList) -> Vec<FolderDescriptor> {
    list.files
        .into_iter()
        .filter_map(|f| {
            f.id.map(|id| FolderDescriptor {
                id,
                name: f.name.unwrap_or_else(|| "Untitled".to_string()),
            })
        })
        .collect()
}

async fn rejected(response: reqwest::Response) -> ProviderError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ProviderError::Rejected { status, body }
}

#[async_trait]
impl DriveProvider for GoogleDrive {
    async fn list_folders(&self, parent_id: &str) -> ProviderResult<Vec<FolderDescriptor>> {
        let auth = self.bearer().await?;
        let response = self
            .http
            .get(format!("{}/files", API_BASE))
            .header("Authorization", auth)
            .query(&[
                ("q", folder_query(parent_id).as_str()),
                ("fields", "files(id,name)"),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::Network(format!("Folder list request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(rejected(response).await);
        }

        let list: DriveFileList = response
            .json()
            .await
            .map_err(|e| ProviderError::Protocol(format!("Malformed folder list: {}", e)))?;

        Ok(into_descriptors(list))
    }

    async fn create_folder(
        &self,
        name: &str,
        parent_id: &str,
    ) -> ProviderResult<FolderDescriptor> {
        let auth = self.bearer().await?;
        let body = serde_json::json!({
            "name": name,
            "mimeType": FOLDER_MIME_TYPE,
            "parents": [parent_id],
        });

        let response = self
            .http
            .post(format!("{}/files", API_BASE))
            .header("Authorization", auth)
            .query(&[("fields", "id,name")])
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(format!("Folder create request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(rejected(response).await);
        }

        let file: DriveFile = response
            .json()
            .await
            .map_err(|e| ProviderError::Protocol(format!("Malformed folder response: {}", e)))?;

        let id = file
            .id
            .ok_or_else(|| ProviderError::Protocol("Created folder has no id".to_string()))?;

        tracing::info!(folder_id = %id, folder_name = %name, "Created destination folder");

        Ok(FolderDescriptor {
            id,
            name: file.name.unwrap_or_else(|| name.to_string()),
        })
    }

    async fn initiate_resumable_session(
        &self,
        name: &str,
        mime_type: &str,
        parent_id: &str,
    ) -> ProviderResult<String> {
        let auth = self.bearer().await?;
        let body = serde_json::json!({
            "name": name,
            "mimeType": mime_type,
            "parents": [parent_id],
        });

        let response = self
            .http
            .post(RESUMABLE_INIT_URL)
            .header("Authorization", auth)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                ProviderError::Network(format!("Resumable initiation request failed: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(rejected(response).await);
        }

        // The session URL travels in the Location header, not the body.
        let upload_url = response
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                ProviderError::Protocol(
                    "Google did not return a Location header (Upload URL).".to_string(),
                )
            })?;

        Ok(upload_url)
    }

    async fn get_file(&self, file_id: &str) -> ProviderResult<FileProbe> {
        let auth = self.bearer().await?;
        let response = self
            .http
            .get(format!("{}/files/{}", API_BASE, file_id))
            .header("Authorization", auth)
            .query(&[("fields", "id,name,trashed")])
            .send()
            .await
            .map_err(|e| ProviderError::Network(format!("File probe request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(rejected(response).await);
        }

        let file: DriveFile = response
            .json()
            .await
            .map_err(|e| ProviderError::Protocol(format!("Malformed file probe: {}", e)))?;

        let id = file
            .id
            .ok_or_else(|| ProviderError::Protocol("File probe has no id".to_string()))?;

        Ok(FileProbe {
            id,
            name: file.name.unwrap_or_else(|| "Untitled".to_string()),
            trashed: file.trashed.unwrap_or(false),
        })
    }
}
