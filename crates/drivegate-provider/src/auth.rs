//! Google OAuth2 token source.
//!
//! Two flows, selected by configuration: the refresh-token flow (web client
//! credentials) and the service-account JWT-bearer flow (RS256 assertion).
//! Access tokens are cached until shortly before expiry; callers always go
//! through [`TokenSource::access_token`].

use crate::traits::{ProviderError, ProviderResult};
use chrono::{DateTime, Duration, Utc};
use drivegate_core::config::{GoogleCredentials, ServiceAccountKey};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const SCOPE: &str = "https://www.googleapis.com/auth/drive.file";
/// Refresh this many seconds before the provider-reported expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    exp: i64,
    iat: i64,
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(EXPIRY_MARGIN_SECS) > now
    }
}

/// Caching access-token source for the Drive API.
pub struct TokenSource {
    http: reqwest::Client,
    credentials: GoogleCredentials,
    cache: Mutex<Option<CachedToken>>,
}

impl TokenSource {
    pub fn new(http: reqwest::Client, credentials: GoogleCredentials) -> Self {
        Self {
            http,
            credentials,
            cache: Mutex::new(None),
        }
    }

    /// Return a valid access token, refreshing it if the cached one is stale.
    pub async fn access_token(&self) -> ProviderResult<String> {
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref() {
            if cached.is_fresh(Utc::now()) {
                return Ok(cached.token.clone());
            }
        }

        let (token, expires_in) = self.fetch_token().await?;
        let expires_at = Utc::now() + Duration::seconds(expires_in);
        *cache = Some(CachedToken {
            token: token.clone(),
            expires_at,
        });
        tracing::debug!(expires_in, "Refreshed provider access token");
        Ok(token)
    }

    async fn fetch_token(&self) -> ProviderResult<(String, i64)> {
        let params: Vec<(&str, String)> = match &self.credentials {
            GoogleCredentials::OAuthRefresh {
                client_id,
                client_secret,
                refresh_token,
            } => vec![
                ("client_id", client_id.clone()),
                ("client_secret", client_secret.clone()),
                ("refresh_token", refresh_token.clone()),
                ("grant_type", "refresh_token".to_string()),
            ],
            GoogleCredentials::ServiceAccount(key) => {
                let assertion = sign_assertion(key, Utc::now())?;
                vec![
                    (
                        "grant_type",
                        "urn:ietf:params:oauth:grant-type:jwt-bearer".to_string(),
                    ),
                    ("assertion", assertion),
                ]
            }
        };

        let response = self
            .http
            .post(TOKEN_URI)
            .form(&params)
            .send()
            .await
            .map_err(|e| ProviderError::Network(format!("Token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Protocol(format!("Malformed token response: {}", e)))?;

        Ok((token.access_token, token.expires_in))
    }
}

/// Build the signed JWT-bearer assertion for a service account.
fn sign_assertion(key: &ServiceAccountKey, now: DateTime<Utc>) -> ProviderResult<String> {
    let iat = now.timestamp();
    let claims = AssertionClaims {
        iss: &key.client_email,
        scope: SCOPE,
        aud: TOKEN_URI,
        exp: iat + 3600,
        iat,
    };

    let header = jsonwebtoken::Header::new(jsonwebtoken::Algorithm::RS256);
    let encoding_key = jsonwebtoken::EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| ProviderError::Auth(format!("Invalid service-account private key: {}", e)))?;

    jsonwebtoken::encode(&header, &claims, &encoding_key)
        .map_err(|e| ProviderError::Auth(format!("Failed to sign assertion: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cached_token_freshness_window() {
        let now = Utc::now();
        let fresh = CachedToken {
            token: "t".to_string(),
            expires_at: now + Duration::seconds(EXPIRY_MARGIN_SECS + 10),
        };
        assert!(fresh.is_fresh(now));

        let near_expiry = CachedToken {
            token: "t".to_string(),
            expires_at: now + Duration::seconds(EXPIRY_MARGIN_SECS - 10),
        };
        assert!(!near_expiry.is_fresh(now));
    }

    #[test]
    fn test_assertion_claims_shape() {
        let now = Utc::now();
        let claims = AssertionClaims {
            iss: "svc@example.iam.gserviceaccount.com",
            scope: SCOPE,
            aud: TOKEN_URI,
            exp: now.timestamp() + 3600,
            iat: now.timestamp(),
        };
        let json = serde_json::to_value(&claims).expect("serialize");
        assert_eq!(
            json.get("aud").and_then(|v| v.as_str()),
            Some("https://oauth2.googleapis.com/token")
        );
        assert_eq!(
            json.get("scope").and_then(|v| v.as_str()),
            Some("https://www.googleapis.com/auth/drive.file")
        );
        assert_eq!(
            json["exp"].as_i64().unwrap() - json["iat"].as_i64().unwrap(),
            3600
        );
    }

    #[test]
    fn test_sign_assertion_rejects_bad_key() {
        let key = ServiceAccountKey::from_json(
            r#"{"client_email":"svc@example.com","private_key":"not a pem"}"#,
        )
        .expect("parse");
        let err = sign_assertion(&key, Utc::now()).unwrap_err();
        assert!(matches!(err, ProviderError::Auth(_)));
    }
}
