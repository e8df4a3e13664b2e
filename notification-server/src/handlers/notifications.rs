use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use service_core::error::AppError;

use super::Payload;
use crate::models::{NotificationKind, Product, PushMessage};
use crate::services::{messages, record_notification, truthy_text, ProductKey};
use crate::startup::AppState;

/// A field as text; falsy values count as absent.
fn present(value: Option<Value>) -> Option<String> {
    value.as_ref().and_then(truthy_text)
}

fn required(value: Option<Value>, message: &'static str) -> Result<String, AppError> {
    present(value).ok_or_else(|| AppError::BadRequest(anyhow::anyhow!(message)))
}

/// Hand one message to the provider, mapping failures to a 500 that carries
/// the provider's message.
async fn dispatch(
    state: &AppState,
    kind: NotificationKind,
    push: &PushMessage,
) -> Result<String, AppError> {
    match state.push_provider.send(push).await {
        Ok(message_id) => {
            record_notification(kind.as_str(), "sent");
            Ok(message_id)
        }
        Err(e) => {
            record_notification(kind.as_str(), "failed");
            tracing::error!(
                kind = %kind,
                delivery = %push.target,
                error = %e,
                "Error sending {} notification",
                kind
            );
            Err(AppError::ProviderError(e.message().to_string()))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HomeNotificationRequest {
    pub token: Option<Value>,
    pub title: Option<Value>,
    pub body: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationResponse {
    pub success: bool,
    pub message_id: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
}

#[tracing::instrument(skip(state, request))]
pub async fn send_home_notification(
    State(state): State<AppState>,
    Payload(request): Payload<HomeNotificationRequest>,
) -> Result<Json<SendNotificationResponse>, AppError> {
    let token = required(request.token, "FCM token is required")?;

    let push = messages::home(&token, present(request.title), present(request.body));
    let message_id = dispatch(&state, NotificationKind::Home, &push).await?;

    tracing::info!(message_id = %message_id, "Home notification sent");

    Ok(Json(SendNotificationResponse {
        success: true,
        message_id,
        message: "Home notification sent successfully".to_string(),
        product: None,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductNotificationRequest {
    pub token: Option<Value>,
    /// Number or string; compared with catalog ids as text.
    pub product_id: Option<Value>,
    pub title: Option<Value>,
    pub body: Option<Value>,
}

#[tracing::instrument(skip(state, request))]
pub async fn send_product_notification(
    State(state): State<AppState>,
    Payload(request): Payload<ProductNotificationRequest>,
) -> Result<Json<SendNotificationResponse>, AppError> {
    let token = required(request.token, "FCM token is required")?;

    let key = request
        .product_id
        .as_ref()
        .and_then(ProductKey::from_json)
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Product ID is required")))?;

    let product = state
        .catalog
        .find(&key)
        .cloned()
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Product not found")))?;

    let push = messages::product(
        &token,
        key.as_str(),
        &product,
        present(request.title),
        present(request.body),
    );
    let message_id = dispatch(&state, NotificationKind::Product, &push).await?;

    tracing::info!(
        message_id = %message_id,
        product_id = product.id,
        "Product notification sent"
    );

    Ok(Json(SendNotificationResponse {
        success: true,
        message_id,
        message: "Product notification sent successfully".to_string(),
        product: Some(product),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicNotificationRequest {
    pub topic: Option<Value>,
    pub title: Option<Value>,
    pub body: Option<Value>,
    #[serde(rename = "type")]
    pub message_type: Option<Value>,
    pub product_id: Option<Value>,
}

#[tracing::instrument(skip(state, request))]
pub async fn send_topic_notification(
    State(state): State<AppState>,
    Payload(request): Payload<TopicNotificationRequest>,
) -> Result<Json<SendNotificationResponse>, AppError> {
    let topic = required(request.topic, "Topic is required")?;

    // Unknown ids are dropped here; the product route answers 404 instead.
    let key = request.product_id.as_ref().and_then(ProductKey::from_json);
    let product = key
        .as_ref()
        .and_then(|key| state.catalog.find(key).map(|p| (key.as_str(), p)));

    let push = messages::topic(
        &topic,
        present(request.message_type),
        product,
        present(request.title),
        present(request.body),
    );
    let message_id = dispatch(&state, NotificationKind::Topic, &push).await?;

    tracing::info!(message_id = %message_id, topic = %topic, "Topic notification sent");

    Ok(Json(SendNotificationResponse {
        success: true,
        message_id,
        message: format!("Topic notification sent successfully to {}", topic),
        product: None,
    }))
}

#[derive(Debug, Deserialize)]
pub struct TestNotificationRequest {
    pub token: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResults {
    pub home: String,
    pub product: String,
    pub tested_product: Product,
}

#[derive(Debug, Serialize)]
pub struct TestNotificationResponse {
    pub success: bool,
    pub message: String,
    pub results: TestResults,
}

/// Sends a home notification, then a product notification for a random
/// catalog entry. Stops at the first failure.
#[tracing::instrument(skip(state, request))]
pub async fn test_notification(
    State(state): State<AppState>,
    Payload(request): Payload<TestNotificationRequest>,
) -> Result<Json<TestNotificationResponse>, AppError> {
    let token = required(request.token, "FCM token is required for testing")?;

    let home_id = dispatch(&state, NotificationKind::Test, &messages::test_home(&token)).await?;

    let product = state
        .catalog
        .random()
        .cloned()
        .ok_or_else(|| AppError::InternalError(anyhow::anyhow!("product catalog is empty")))?;

    let product_id = dispatch(
        &state,
        NotificationKind::Test,
        &messages::test_product(&token, &product),
    )
    .await?;

    tracing::info!(
        home_message_id = %home_id,
        product_message_id = %product_id,
        product_id = product.id,
        "Test notifications sent"
    );

    Ok(Json(TestNotificationResponse {
        success: true,
        message: "Test notifications sent successfully".to_string(),
        results: TestResults {
            home: home_id,
            product: product_id,
            tested_product: product,
        },
    }))
}
