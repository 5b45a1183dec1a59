//! Session broker: turns a session request into a single-use resumable
//! upload URL.
//!
//! The broker owns the order of operations for one grant: validate the
//! request, resolve the destination folder, then ask the provider to open a
//! resumable session parented under it. The grant itself carries no
//! credentials; the upload URL is the capability.

use drivegate_core::models::{Destination, SessionGrant, SessionRequest};
use drivegate_core::{AppError, Config};
use drivegate_provider::{DriveProvider, ProviderError};
use std::sync::Arc;

#[derive(Clone)]
pub struct SessionBroker {
    provider: Arc<dyn DriveProvider>,
    root_folder_id: String,
    validate_destination: bool,
}

impl SessionBroker {
    pub fn new(provider: Arc<dyn DriveProvider>, config: Config) -> Self {
        Self {
            provider,
            root_folder_id: config.root_folder_id,
            validate_destination: config.validate_destination,
        }
    }

    /// Broker one resumable upload session.
    ///
    /// Destination precedence: a non-empty `newFolderName` wins over an
    /// explicit `folderId`, which wins over the configured root.
    pub async fn create_session(&self, request: &SessionRequest) -> Result<SessionGrant, AppError> {
        let file_name = request
            .file_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AppError::InvalidRequest("fileName is required".to_string()))?;

        let folder_id = self
            .resolve_destination(
                request.new_folder_name.as_deref(),
                request.folder_id.as_deref(),
            )
            .await?;

        let upload_url = self
            .provider
            .initiate_resumable_session(file_name, request.content_type(), &folder_id)
            .await
            .map_err(map_session_error)?;

        tracing::info!(
            folder_id = %folder_id,
            file_name = %file_name,
            "Brokered resumable upload session"
        );

        Ok(SessionGrant {
            upload_url,
            folder_id,
        })
    }

    /// Resolve the destination folder id for one request, creating a folder
    /// under the root when asked to.
    pub async fn resolve_destination(
        &self,
        new_folder_name: Option<&str>,
        folder_id: Option<&str>,
    ) -> Result<String, AppError> {
        match Destination::resolve(new_folder_name, folder_id) {
            Destination::NewFolder(name) => {
                let folder = self
                    .provider
                    .create_folder(&name, &self.root_folder_id)
                    .await
                    .map_err(|e| {
                        AppError::DestinationCreateFailed(format!(
                            "Failed to create folder '{}': {}",
                            name, e
                        ))
                    })?;
                Ok(folder.id)
            }
            Destination::Existing(id) => {
                if self.validate_destination {
                    self.probe_destination(&id).await?;
                }
                Ok(id)
            }
            Destination::Root => Ok(self.root_folder_id.clone()),
        }
    }

    /// Confirm an explicit destination folder id is reachable and not trashed.
    async fn probe_destination(&self, folder_id: &str) -> Result<(), AppError> {
        let probe = self.provider.get_file(folder_id).await.map_err(|e| {
            AppError::DestinationUnavailable(format!(
                "Destination folder '{}' is not accessible: {}",
                folder_id, e
            ))
        })?;

        if probe.trashed {
            return Err(AppError::DestinationUnavailable(format!(
                "Destination folder '{}' is trashed",
                folder_id
            )));
        }
        Ok(())
    }
}

/// Map provider failures during session initiation onto the gateway taxonomy.
fn map_session_error(err: ProviderError) -> AppError {
    match err {
        ProviderError::Auth(msg) => AppError::MissingConfiguration(msg),
        ProviderError::Rejected { status, body } => AppError::ProviderRejected { status, body },
        ProviderError::Protocol(msg) => AppError::ProviderProtocol(msg),
        ProviderError::Network(msg) => AppError::Network(msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use drivegate_core::config::{BaseConfig, GoogleCredentials};
    use drivegate_core::models::{FileProbe, FolderDescriptor};
    use drivegate_core::ErrorMetadata;
    use drivegate_provider::ProviderResult;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct MockProvider {
        create_calls: AtomicUsize,
        probe_calls: AtomicUsize,
        initiated: Mutex<Vec<(String, String, String)>>,
        create_result: Mutex<Option<ProviderResult<FolderDescriptor>>>,
        probe_result: Mutex<Option<ProviderResult<FileProbe>>>,
        session_result: Mutex<Option<ProviderResult<String>>>,
    }

    impl MockProvider {
        fn new() -> Self {
            Self {
                create_calls: AtomicUsize::new(0),
                probe_calls: AtomicUsize::new(0),
                initiated: Mutex::new(Vec::new()),
                create_result: Mutex::new(None),
                probe_result: Mutex::new(None),
                session_result: Mutex::new(None),
            }
        }

        fn with_session_url(url: &str) -> Self {
            let mock = Self::new();
            *mock.session_result.lock().unwrap() = Some(Ok(url.to_string()));
            mock
        }
    }

    #[async_trait]
    impl DriveProvider for MockProvider {
        async fn list_folders(&self, _parent_id: &str) -> ProviderResult<Vec<FolderDescriptor>> {
            Ok(Vec::new())
        }

        async fn create_folder(
            &self,
            name: &str,
            parent_id: &str,
        ) -> ProviderResult<FolderDescriptor> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            match self.create_result.lock().unwrap().take() {
                Some(result) => result,
                None => Ok(FolderDescriptor {
                    id: format!("created-{}-under-{}", name, parent_id),
                    name: name.to_string(),
                }),
            }
        }

        async fn initiate_resumable_session(
            &self,
            name: &str,
            mime_type: &str,
            parent_id: &str,
        ) -> ProviderResult<String> {
            self.initiated.lock().unwrap().push((
                name.to_string(),
                mime_type.to_string(),
                parent_id.to_string(),
            ));
            match self.session_result.lock().unwrap().take() {
                Some(result) => result,
                None => Ok("https://upload.example/session/1".to_string()),
            }
        }

        async fn get_file(&self, file_id: &str) -> ProviderResult<FileProbe> {
            self.probe_calls.fetch_add(1, Ordering::SeqCst);
            match self.probe_result.lock().unwrap().take() {
                Some(result) => result,
                None => Ok(FileProbe {
                    id: file_id.to_string(),
                    name: "folder".to_string(),
                    trashed: false,
                }),
            }
        }
    }

    fn test_config(validate_destination: bool) -> Config {
        Config {
            base: BaseConfig {
                server_port: 4000,
                cors_origins: vec!["*".to_string()],
                environment: "test".to_string(),
            },
            credentials: GoogleCredentials::OAuthRefresh {
                client_id: "cid".to_string(),
                client_secret: "secret".to_string(),
                refresh_token: "rtok".to_string(),
            },
            root_folder_id: "root-1".to_string(),
            validate_destination,
        }
    }

    fn broker_with(mock: MockProvider, validate_destination: bool) -> (SessionBroker, Arc<MockProvider>) {
        let provider = Arc::new(mock);
        let broker = SessionBroker::new(provider.clone(), test_config(validate_destination));
        (broker, provider)
    }

    fn request(
        file_name: Option<&str>,
        folder_id: Option<&str>,
        new_folder_name: Option<&str>,
    ) -> SessionRequest {
        SessionRequest {
            file_name: file_name.map(String::from),
            folder_id: folder_id.map(String::from),
            new_folder_name: new_folder_name.map(String::from),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_missing_file_name_rejected_before_provider_call() {
        let (broker, provider) = broker_with(MockProvider::new(), false);
        for file_name in [None, Some(""), Some("   ")] {
            let err = broker
                .create_session(&request(file_name, Some("F1"), None))
                .await
                .unwrap_err();
            match err {
                AppError::InvalidRequest(msg) => assert_eq!(msg, "fileName is required"),
                other => panic!("Expected InvalidRequest, got {:?}", other),
            }
        }
        assert!(provider.initiated.lock().unwrap().is_empty());
        assert_eq!(provider.create_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_new_folder_name_wins_and_creates_under_root() {
        let (broker, provider) = broker_with(MockProvider::new(), false);
        let grant = broker
            .create_session(&request(Some("a.png"), Some("F1"), Some("reports")))
            .await
            .expect("grant");

        assert_eq!(provider.create_calls.load(Ordering::SeqCst), 1);
        assert_eq!(grant.folder_id, "created-reports-under-root-1");

        let initiated = provider.initiated.lock().unwrap();
        assert_eq!(
            initiated.as_slice(),
            &[(
                "a.png".to_string(),
                "application/octet-stream".to_string(),
                "created-reports-under-root-1".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_explicit_folder_id_used_without_create() {
        let (broker, provider) = broker_with(MockProvider::new(), false);
        let grant = broker
            .create_session(&request(Some("a.png"), Some(" F1 "), None))
            .await
            .expect("grant");

        assert_eq!(grant.folder_id, "F1");
        assert_eq!(provider.create_calls.load(Ordering::SeqCst), 0);
        assert_eq!(provider.probe_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_root_fallback_when_no_destination_given() {
        let (broker, _provider) = broker_with(MockProvider::new(), false);
        let grant = broker
            .create_session(&request(Some("a.png"), None, None))
            .await
            .expect("grant");
        assert_eq!(grant.folder_id, "root-1");
    }

    #[tokio::test]
    async fn test_declared_mime_type_is_forwarded() {
        let (broker, provider) = broker_with(MockProvider::new(), false);
        let mut req = request(Some("a.png"), None, None);
        req.file_type = Some("image/png".to_string());
        broker.create_session(&req).await.expect("grant");

        let initiated = provider.initiated.lock().unwrap();
        assert_eq!(initiated[0].1, "image/png");
    }

    #[tokio::test]
    async fn test_folder_create_failure_is_isolated() {
        let mock = MockProvider::new();
        *mock.create_result.lock().unwrap() = Some(Err(ProviderError::Rejected {
            status: 403,
            body: "quota".to_string(),
        }));
        let (broker, provider) = broker_with(mock, false);

        let err = broker
            .create_session(&request(Some("a.png"), None, Some("reports")))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::DestinationCreateFailed(_)));
        // No session is initiated when the destination cannot be created.
        assert!(provider.initiated.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_destination_probe_runs_only_when_enabled() {
        let (broker, provider) = broker_with(MockProvider::new(), true);
        broker
            .create_session(&request(Some("a.png"), Some("F1"), None))
            .await
            .expect("grant");
        assert_eq!(provider.probe_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_trashed_destination_rejected() {
        let mock = MockProvider::new();
        *mock.probe_result.lock().unwrap() = Some(Ok(FileProbe {
            id: "F1".to_string(),
            name: "old".to_string(),
            trashed: true,
        }));
        let (broker, provider) = broker_with(mock, true);

        let err = broker
            .create_session(&request(Some("a.png"), Some("F1"), None))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::DestinationUnavailable(_)));
        assert!(provider.initiated.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_provider_rejection_carries_status_and_body() {
        let mock = MockProvider::new();
        *mock.session_result.lock().unwrap() = Some(Err(ProviderError::Rejected {
            status: 401,
            body: "invalid_grant".to_string(),
        }));
        let (broker, _provider) = broker_with(mock, false);

        let err = broker
            .create_session(&request(Some("a.png"), None, None))
            .await
            .unwrap_err();

        match err {
            AppError::ProviderRejected { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid_grant");
            }
            other => panic!("Expected ProviderRejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_location_surfaces_as_protocol_error() {
        let mock = MockProvider::new();
        *mock.session_result.lock().unwrap() = Some(Err(ProviderError::Protocol(
            "Google did not return a Location header (Upload URL).".to_string(),
        )));
        let (broker, _provider) = broker_with(mock, false);

        let err = broker
            .create_session(&request(Some("a.png"), None, None))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ProviderProtocol(_)));
        assert_eq!(err.error_code(), "PROVIDER_PROTOCOL_ERROR");
    }

    #[tokio::test]
    async fn test_grant_carries_session_url() {
        let (broker, _provider) =
            broker_with(MockProvider::with_session_url("https://upload.example/s/42"), false);
        let grant = broker
            .create_session(&request(Some("a.png"), None, None))
            .await
            .expect("grant");
        assert_eq!(grant.upload_url, "https://upload.example/s/42");
    }
}
