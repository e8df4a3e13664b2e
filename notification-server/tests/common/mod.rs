#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use notification_server::models::PushMessage;
use notification_server::services::{Catalog, ProviderError, PushProvider};
use notification_server::startup::{build_router, AppState};
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt;

/// Records every message it is asked to send and answers with FCM-style ids.
#[derive(Default)]
pub struct RecordingPushProvider {
    sent: Mutex<Vec<PushMessage>>,
    failure: Option<String>,
    unhealthy: Option<String>,
}

impl RecordingPushProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A provider whose every send fails with `message`.
    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            failure: Some(message.to_string()),
            ..Self::default()
        })
    }

    /// A provider that sends fine but fails its health check with `message`.
    pub fn unhealthy(message: &str) -> Arc<Self> {
        Arc::new(Self {
            unhealthy: Some(message.to_string()),
            ..Self::default()
        })
    }

    pub fn sent(&self) -> Vec<PushMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushProvider for RecordingPushProvider {
    async fn send(&self, push: &PushMessage) -> Result<String, ProviderError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(push.clone());
        match &self.failure {
            Some(message) => Err(ProviderError::SendFailed(message.clone())),
            None => Ok(format!("projects/test-project/messages/{}", sent.len())),
        }
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        match &self.unhealthy {
            Some(message) => Err(ProviderError::Authentication(message.clone())),
            None => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Panics on send, standing in for an unexpected fault inside a handler.
pub struct PanickingPushProvider;

#[async_trait]
impl PushProvider for PanickingPushProvider {
    async fn send(&self, _push: &PushMessage) -> Result<String, ProviderError> {
        panic!("provider exploded");
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "panicking"
    }
}

pub struct TestApp {
    pub router: Router,
}

impl TestApp {
    pub fn with_provider(provider: Arc<dyn PushProvider>) -> Self {
        let state = AppState::new(Catalog::seeded(), provider);
        Self {
            router: build_router(state),
        }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        self.call(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        self.call(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn post_raw(
        &self,
        uri: &str,
        content_type: Option<&str>,
        body: &str,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method("POST").uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        self.call(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// GET returning the raw body and its content type.
    pub async fn get_text(&self, uri: &str) -> (StatusCode, String, String) {
        let response = self
            .router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();

        (status, content_type, String::from_utf8_lossy(&bytes).into_owned())
    }

    pub async fn call(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("Response body is not JSON")
        };

        (status, body)
    }
}
