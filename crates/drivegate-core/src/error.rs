//! Error types module
//!
//! All failures in the upload pipeline are unified under the `AppError` enum:
//! configuration problems, bad caller input, destination resolution failures,
//! and the three ways a provider call can go wrong (rejected with a status,
//! responded off-contract, or never responded at all).

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "INVALID_REQUEST")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    MissingConfiguration(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Failed to create new folder: {0}")]
    DestinationCreateFailed(String),

    #[error("Destination folder unavailable: {0}")]
    DestinationUnavailable(String),

    #[error("Provider protocol error: {0}")]
    ProviderProtocol(String),

    #[error("Provider rejected request with status {status}")]
    ProviderRejected { status: u16, body: String },

    #[error("Network failure: {0}")]
    Network(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidRequest(format!("JSON parsing error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
/// The whole broker surface reports 500 with a descriptive `error` string, matching the
/// gateway's public contract; `error_code` is what distinguishes caller mistakes from
/// provider failures programmatically.
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::MissingConfiguration(_) => (
            500,
            "MISSING_CONFIGURATION",
            false,
            Some("Set the missing environment variable and restart"),
            false,
            LogLevel::Error,
        ),
        AppError::InvalidRequest(_) => (
            500,
            "INVALID_REQUEST",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::DestinationCreateFailed(_) => (
            500,
            "DESTINATION_CREATE_FAILED",
            true,
            Some("Retry, or pick an existing destination folder"),
            false,
            LogLevel::Warn,
        ),
        AppError::DestinationUnavailable(_) => (
            500,
            "DESTINATION_UNAVAILABLE",
            false,
            Some("Verify the destination folder exists and is not trashed"),
            false,
            LogLevel::Warn,
        ),
        AppError::ProviderProtocol(_) => (
            500,
            "PROVIDER_PROTOCOL_ERROR",
            true,
            Some("Retry after a short delay"),
            false,
            LogLevel::Error,
        ),
        AppError::ProviderRejected { .. } => (
            500,
            "PROVIDER_REJECTED",
            false,
            Some("Check provider credentials and permissions"),
            false,
            LogLevel::Warn,
        ),
        AppError::Network(_) => (
            500,
            "NETWORK_FAILURE",
            true,
            Some("Retry after a short delay"),
            false,
            LogLevel::Warn,
        ),
        AppError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::MissingConfiguration(_) => "MissingConfiguration",
            AppError::InvalidRequest(_) => "InvalidRequest",
            AppError::DestinationCreateFailed(_) => "DestinationCreateFailed",
            AppError::DestinationUnavailable(_) => "DestinationUnavailable",
            AppError::ProviderProtocol(_) => "ProviderProtocol",
            AppError::ProviderRejected { .. } => "ProviderRejected",
            AppError::Network(_) => "Network",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Provider diagnostic payload, when the provider returned one.
    pub fn provider_details(&self) -> Option<&str> {
        match self {
            AppError::ProviderRejected { body, .. } if !body.is_empty() => Some(body),
            _ => None,
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            // Broker failures are surfaced verbatim; the UI shows them per task.
            AppError::MissingConfiguration(msg) => msg.clone(),
            AppError::InvalidRequest(msg) => msg.clone(),
            AppError::DestinationCreateFailed(_) => self.to_string(),
            AppError::DestinationUnavailable(_) => self.to_string(),
            AppError::ProviderProtocol(_) => self.to_string(),
            AppError::ProviderRejected { .. } => self.to_string(),
            AppError::Network(_) => self.to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_missing_configuration() {
        let err = AppError::MissingConfiguration("MISSING ENV: GOOGLE_CLIENT_ID".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "MISSING_CONFIGURATION");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "MISSING ENV: GOOGLE_CLIENT_ID");
        assert!(!err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_metadata_invalid_request() {
        let err = AppError::InvalidRequest("fileName is required".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "INVALID_REQUEST");
        assert_eq!(err.client_message(), "fileName is required");
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_provider_rejected_carries_body() {
        let err = AppError::ProviderRejected {
            status: 403,
            body: r#"{"error":"insufficientPermissions"}"#.to_string(),
        };
        assert_eq!(err.error_code(), "PROVIDER_REJECTED");
        assert!(err.client_message().contains("403"));
        assert_eq!(
            err.provider_details(),
            Some(r#"{"error":"insufficientPermissions"}"#)
        );
    }

    #[test]
    fn test_provider_details_absent_for_empty_body() {
        let err = AppError::ProviderRejected {
            status: 500,
            body: String::new(),
        };
        assert_eq!(err.provider_details(), None);
        assert_eq!(
            AppError::Network("connection reset".to_string()).provider_details(),
            None
        );
    }

    #[test]
    fn test_internal_hides_details() {
        let err = AppError::Internal("pool exhausted".to_string());
        assert!(err.is_sensitive());
        assert_eq!(err.client_message(), "Internal server error");
    }

    #[test]
    fn test_detailed_message_includes_source_chain() {
        let source = anyhow::anyhow!("token endpoint unreachable");
        let err = AppError::InternalWithSource {
            message: "session initiation failed".to_string(),
            source,
        };
        let details = err.detailed_message();
        assert!(details.contains("Caused by: token endpoint unreachable"));
    }
}
