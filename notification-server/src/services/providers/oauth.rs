//! OAuth2 access tokens for Google APIs from a service account key.
//!
//! Implements the JWT-bearer grant: an RS256 assertion signed with the
//! service account's private key is exchanged at `token_uri` for a
//! short-lived bearer token, which is cached until shortly before expiry.

use super::ProviderError;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

pub const FIREBASE_MESSAGING_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Refresh this long before the token actually expires.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// The fields of a Google service account JSON that are needed here.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: String,
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ProviderError::Configuration(format!(
                "Failed to read service account key from {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ProviderError> {
        serde_json::from_str(raw).map_err(|e| {
            ProviderError::Configuration(format!("Invalid service account key: {}", e))
        })
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    ASSERTION_LIFETIME_SECS as u64
}

#[derive(Debug)]
struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// Hands out bearer tokens for a single scope, refreshing on demand.
pub struct AccessTokenSource {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    scope: String,
    client: Client,
    cached: Mutex<Option<CachedToken>>,
}

impl AccessTokenSource {
    pub fn new(key: ServiceAccountKey, scope: &str, client: Client) -> Result<Self, ProviderError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            ProviderError::Configuration(format!("Failed to parse service account private key: {}", e))
        })?;

        Ok(Self {
            key,
            encoding_key,
            scope: scope.to_string(),
            client,
            cached: Mutex::new(None),
        })
    }

    /// A valid bearer token, fetching a new one if the cached token is stale.
    pub async fn access_token(&self) -> Result<String, ProviderError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.value.clone());
            }
        }

        let fresh = self.fetch().await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }

    fn assertion(&self) -> Result<String, ProviderError> {
        let now = chrono::Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: &self.scope,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key).map_err(|e| {
            ProviderError::Authentication(format!("Failed to sign token assertion: {}", e))
        })
    }

    async fn fetch(&self) -> Result<CachedToken, ProviderError> {
        let assertion = self.assertion()?;
        let requested_at = Instant::now();

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| {
                ProviderError::Connection(format!("Failed to reach token endpoint: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Authentication(format!(
                "Token endpoint returned {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            ProviderError::Authentication(format!("Failed to parse token response: {}", e))
        })?;

        tracing::debug!(
            client_email = %self.key.client_email,
            expires_in = token.expires_in,
            "Obtained access token"
        );

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(EXPIRY_MARGIN);
        Ok(CachedToken {
            value: token.access_token,
            refresh_at: requested_at + lifetime,
        })
    }
}
