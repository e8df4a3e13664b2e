use super::oauth::{AccessTokenSource, ServiceAccountKey, FIREBASE_MESSAGING_SCOPE};
use super::{ProviderError, PushProvider};
use crate::config::FcmConfig;
use crate::models::{PushMessage, PushTarget};
use crate::services::metrics::record_provider_call;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Firebase Cloud Messaging over the HTTP v1 API.
pub struct FcmProvider {
    config: FcmConfig,
    project_id: String,
    client: Client,
    tokens: AccessTokenSource,
}

#[derive(Debug, Serialize)]
struct FcmRequest<'a> {
    message: FcmMessage<'a>,
}

#[derive(Debug, Serialize)]
struct FcmMessage<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    topic: Option<&'a str>,
    notification: FcmNotification<'a>,
    data: &'a HashMap<String, String>,
}

#[derive(Debug, Serialize)]
struct FcmNotification<'a> {
    title: &'a str,
    body: &'a str,
}

impl<'a> From<&'a PushMessage> for FcmMessage<'a> {
    fn from(push: &'a PushMessage) -> Self {
        let (token, topic) = match &push.target {
            PushTarget::Token(token) => (Some(token.as_str()), None),
            // FCM wants the bare topic name.
            PushTarget::Topic(topic) => (None, Some(topic.trim_start_matches("/topics/"))),
        };

        Self {
            token,
            topic,
            notification: FcmNotification {
                title: &push.title,
                body: &push.body,
            },
            data: &push.data,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FcmResponse {
    name: String,
}

#[derive(Debug, Deserialize)]
struct FcmErrorResponse {
    error: FcmError,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct FcmError {
    #[serde(default)]
    code: i32,
    message: String,
    #[serde(default)]
    status: String,
}

/// The human-readable part of an FCM error body, or the raw body if it is
/// not the standard error envelope.
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<FcmErrorResponse>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) if body.trim().is_empty() => format!("FCM API returned error status {}", status),
        Err(_) => body.to_string(),
    }
}

impl FcmProvider {
    /// Load the service account key named by `config` and prepare a client.
    pub fn new(config: FcmConfig) -> Result<Self, ProviderError> {
        let key = ServiceAccountKey::from_file(&config.service_account_path)?;
        Self::with_key(config, key)
    }

    pub fn with_key(config: FcmConfig, key: ServiceAccountKey) -> Result<Self, ProviderError> {
        let project_id = config
            .project_id
            .clone()
            .unwrap_or_else(|| key.project_id.clone());
        if project_id.is_empty() {
            return Err(ProviderError::Configuration(
                "FCM project_id is not configured".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        let tokens = AccessTokenSource::new(key, FIREBASE_MESSAGING_SCOPE, client.clone())?;

        Ok(Self {
            config,
            project_id,
            client,
            tokens,
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    fn send_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/messages:send",
            self.config.api_url.trim_end_matches('/'),
            self.project_id
        )
    }

    async fn deliver(&self, push: &PushMessage) -> Result<String, ProviderError> {
        let access_token = self.tokens.access_token().await?;

        let request = FcmRequest {
            message: FcmMessage::from(push),
        };

        let response = self
            .client
            .post(self.send_url())
            .bearer_auth(&access_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Connection(format!("Failed to connect to FCM: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::SendFailed(error_message(status, &body)));
        }

        let fcm_response: FcmResponse = response.json().await.map_err(|e| {
            ProviderError::SendFailed(format!("Failed to parse FCM response: {}", e))
        })?;

        Ok(fcm_response.name)
    }
}

#[async_trait]
impl PushProvider for FcmProvider {
    async fn send(&self, push: &PushMessage) -> Result<String, ProviderError> {
        match self.deliver(push).await {
            Ok(message_id) => {
                record_provider_call(self.name(), "success");
                tracing::info!(
                    delivery = %push.target,
                    message_id = %message_id,
                    "Push notification sent successfully via FCM"
                );
                Ok(message_id)
            }
            Err(e) => {
                record_provider_call(self.name(), "failure");
                tracing::warn!(delivery = %push.target, error = %e, "FCM send failed");
                Err(e)
            }
        }
    }

    /// Credentials were validated at construction; a healthy FCM provider
    /// is one that can still mint an access token.
    async fn health_check(&self) -> Result<(), ProviderError> {
        self.tokens.access_token().await.map(|_| ())
    }

    fn name(&self) -> &'static str {
        "fcm"
    }
}

/// Push provider that logs instead of sending; selected when FCM is disabled.
#[derive(Default)]
pub struct MockPushProvider {
    send_count: AtomicU64,
}

impl MockPushProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send_count(&self) -> u64 {
        self.send_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PushProvider for MockPushProvider {
    async fn send(&self, push: &PushMessage) -> Result<String, ProviderError> {
        let count = self.send_count.fetch_add(1, Ordering::SeqCst) + 1;
        record_provider_call(self.name(), "success");

        tracing::info!(
            delivery = %push.target,
            title = %push.title,
            message_type = push.message_type().unwrap_or("-"),
            "[MOCK] Push notification would be sent"
        );

        Ok(format!("mock-push-{}", count))
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
