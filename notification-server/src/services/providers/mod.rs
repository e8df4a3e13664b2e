pub mod oauth;
pub mod push;

use crate::models::PushMessage;
use async_trait::async_trait;
use thiserror::Error;

pub use oauth::{AccessTokenSource, ServiceAccountKey};
pub use push::{FcmProvider, MockPushProvider};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Send error: {0}")]
    SendFailed(String),

    #[error("Authentication error: {0}")]
    Authentication(String),
}

impl ProviderError {
    /// The provider's own description, without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            ProviderError::Configuration(msg)
            | ProviderError::Connection(msg)
            | ProviderError::SendFailed(msg)
            | ProviderError::Authentication(msg) => msg,
        }
    }
}

/// The one capability the handlers need from a messaging backend.
#[async_trait]
pub trait PushProvider: Send + Sync {
    /// Deliver `push` and return the provider-assigned message id.
    async fn send(&self, push: &PushMessage) -> Result<String, ProviderError>;
    /// Whether the provider is able to send; drives `/health`.
    async fn health_check(&self) -> Result<(), ProviderError>;
    /// Short label for logs and metrics.
    fn name(&self) -> &'static str;
}
