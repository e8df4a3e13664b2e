mod common;

use axum::http::StatusCode;
use common::{PanickingPushProvider, RecordingPushProvider, TestApp};
use notification_server::models::PushTarget;
use notification_server::services::{init_metrics, Catalog};
use serde_json::json;
use std::sync::{Arc, Once};

// =============================================================================
// Health & catalog
// =============================================================================

#[tokio::test]
async fn index_reports_running() {
    let app = TestApp::with_provider(RecordingPushProvider::new());

    let (status, body) = app.get("/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "running");
    assert_eq!(body["message"], "Houzou Medical Notification Server");
    let timestamp = body["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    assert!(timestamp.ends_with('Z'));
}

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::with_provider(RecordingPushProvider::new());

    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "notification-server");
}

#[tokio::test]
async fn health_check_reports_unhealthy_provider() {
    let app = TestApp::with_provider(RecordingPushProvider::unhealthy(
        "Failed to parse service account private key",
    ));

    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["service"], "notification-server");
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Failed to parse service account private key"));
}

#[tokio::test]
async fn metrics_exposes_prometheus_text() {
    static INIT: Once = Once::new();
    INIT.call_once(|| init_metrics().expect("Failed to install metrics recorder"));

    let app = TestApp::with_provider(RecordingPushProvider::new());
    let (status, _) = app
        .post_json("/send-home-notification", json!({"token": "t1"}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, content_type, body) = app.get_text("/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("text/plain"));
    assert!(body.contains("http_requests_total"));
    assert!(body.contains(r#"notification_sent_total{kind="home",status="sent"}"#));
}

#[tokio::test]
async fn products_returns_seeded_catalog() {
    let provider = RecordingPushProvider::new();
    let app = TestApp::with_provider(provider.clone());
    let expected = serde_json::to_value(Catalog::seeded().products()).unwrap();

    let (status, body) = app.get("/products").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["products"], expected);

    // Sends do not change what the listing returns.
    app.post_json(
        "/send-product-notification",
        json!({"token": "t1", "productId": 3}),
    )
    .await;
    app.post_json("/test-notification", json!({"token": "t1"})).await;

    let (_, again) = app.get("/products").await;
    assert_eq!(again["products"], expected);
}

#[tokio::test]
async fn unknown_route_uses_error_shape() {
    let app = TestApp::with_provider(RecordingPushProvider::new());

    let (status, body) = app.get("/nope").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

// =============================================================================
// Home
// =============================================================================

#[tokio::test]
async fn home_notification_uses_defaults() {
    let provider = RecordingPushProvider::new();
    let app = TestApp::with_provider(provider.clone());

    let (status, body) = app
        .post_json("/send-home-notification", json!({"token": "t1"}))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["messageId"], "projects/test-project/messages/1");
    assert_eq!(body["message"], "Home notification sent successfully");

    let sent = provider.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].target, PushTarget::Token("t1".to_string()));
    assert_eq!(sent[0].title, "Welcome Back!");
    assert_eq!(sent[0].body, "Check out our latest health supplements");
    assert_eq!(sent[0].data["type"], "home");
    assert_eq!(sent[0].data["click_action"], "FLUTTER_NOTIFICATION_CLICK");
}

#[tokio::test]
async fn home_notification_honours_overrides() {
    let provider = RecordingPushProvider::new();
    let app = TestApp::with_provider(provider.clone());

    let (status, _) = app
        .post_json(
            "/send-home-notification",
            json!({"token": "t1", "title": "Hi", "body": "There"}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let sent = provider.sent();
    assert_eq!(sent[0].title, "Hi");
    assert_eq!(sent[0].body, "There");
}

#[tokio::test]
async fn missing_token_is_rejected_without_sending() {
    let provider = RecordingPushProvider::new();
    let app = TestApp::with_provider(provider.clone());

    let cases = [
        ("/send-home-notification", json!({}), "FCM token is required"),
        ("/send-home-notification", json!({"token": ""}), "FCM token is required"),
        (
            "/send-product-notification",
            json!({"productId": 2}),
            "FCM token is required",
        ),
        (
            "/test-notification",
            json!({"token": null}),
            "FCM token is required for testing",
        ),
    ];

    for (uri, request, message) in cases {
        let (status, body) = app.post_json(uri, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], message);
    }

    assert!(provider.sent().is_empty());
}

#[tokio::test]
async fn empty_body_counts_as_missing_token() {
    let provider = RecordingPushProvider::new();
    let app = TestApp::with_provider(provider.clone());

    let (status, body) = app.post_raw("/send-home-notification", None, "").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "FCM token is required");
    assert!(provider.sent().is_empty());
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let provider = RecordingPushProvider::new();
    let app = TestApp::with_provider(provider.clone());

    let (status, body) = app
        .post_raw("/send-home-notification", Some("application/json"), "{token:")
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(provider.sent().is_empty());
}

#[tokio::test]
async fn form_bodies_are_accepted() {
    let provider = RecordingPushProvider::new();
    let app = TestApp::with_provider(provider.clone());

    let (status, body) = app
        .post_raw(
            "/send-product-notification",
            Some("application/x-www-form-urlencoded"),
            "token=t1&productId=2",
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["id"], 2);
    assert_eq!(provider.sent()[0].data["product_id"], "2");
}

// =============================================================================
// Product
// =============================================================================

#[tokio::test]
async fn product_notification_embeds_product() {
    let provider = RecordingPushProvider::new();
    let app = TestApp::with_provider(provider.clone());

    let (status, body) = app
        .post_json(
            "/send-product-notification",
            json!({"token": "t1", "productId": 2}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Product notification sent successfully");
    assert_eq!(
        body["product"],
        json!({
            "id": 2,
            "title": "Arginine & Citrulline",
            "price": "¥5,200",
            "category": "Sports Nutrition"
        })
    );

    let sent = provider.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, "New Deal: Arginine & Citrulline");
    assert_eq!(
        sent[0].body,
        "Special offer on Arginine & Citrulline - ¥5,200. Tap to view details!"
    );
    assert_eq!(sent[0].data["type"], "product_detail");
    assert_eq!(sent[0].data["product_id"], "2");
    assert_eq!(sent[0].data["product_title"], "Arginine & Citrulline");
    assert_eq!(sent[0].data["product_price"], "¥5,200");
}

#[tokio::test]
async fn product_id_may_be_a_string() {
    let provider = RecordingPushProvider::new();
    let app = TestApp::with_provider(provider.clone());

    let (status, body) = app
        .post_json(
            "/send-product-notification",
            json!({"token": "t1", "productId": "5"}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["title"], "Alpha-GPC Cognitive");
}

#[tokio::test]
async fn product_id_array_matches_joined_text() {
    let provider = RecordingPushProvider::new();
    let app = TestApp::with_provider(provider.clone());

    let (status, body) = app
        .post_json(
            "/send-product-notification",
            json!({"token": "t1", "productId": [2]}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["id"], 2);
    assert_eq!(provider.sent()[0].data["product_id"], "2");

    let (status, body) = app
        .post_json(
            "/send-product-notification",
            json!({"token": "t1", "productId": [1, 2]}),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Product not found");
}

#[tokio::test]
async fn non_string_fields_are_sent_as_text() {
    let provider = RecordingPushProvider::new();
    let app = TestApp::with_provider(provider.clone());

    let (status, _) = app
        .post_json(
            "/send-home-notification",
            json!({"token": 12345, "title": 42, "body": false}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let sent = provider.sent();
    assert_eq!(sent[0].target, PushTarget::Token("12345".to_string()));
    assert_eq!(sent[0].title, "42");
    assert_eq!(sent[0].body, "Check out our latest health supplements");
}

#[tokio::test]
async fn missing_product_id_is_rejected() {
    let provider = RecordingPushProvider::new();
    let app = TestApp::with_provider(provider.clone());

    for request in [json!({"token": "t1"}), json!({"token": "t1", "productId": 0})] {
        let (status, body) = app.post_json("/send-product-notification", request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Product ID is required");
    }

    assert!(provider.sent().is_empty());
}

#[tokio::test]
async fn unknown_product_is_not_found() {
    let provider = RecordingPushProvider::new();
    let app = TestApp::with_provider(provider.clone());

    for product_id in [json!(99), json!("02")] {
        let (status, body) = app
            .post_json(
                "/send-product-notification",
                json!({"token": "t1", "productId": product_id}),
            )
            .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Product not found");
    }

    assert!(provider.sent().is_empty());
}

// =============================================================================
// Topic
// =============================================================================

#[tokio::test]
async fn topic_notification_targets_topic() {
    let provider = RecordingPushProvider::new();
    let app = TestApp::with_provider(provider.clone());

    let (status, body) = app
        .post_json("/send-topic-notification", json!({"topic": "all_users"}))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Topic notification sent successfully to all_users");

    let sent = provider.sent();
    assert_eq!(sent[0].target, PushTarget::Topic("all_users".to_string()));
    assert_eq!(sent[0].title, "Houzou Medical");
    assert_eq!(sent[0].body, "New update available!");
    assert_eq!(sent[0].data["type"], "home");
}

#[tokio::test]
async fn topic_product_detail_attaches_known_product() {
    let provider = RecordingPushProvider::new();
    let app = TestApp::with_provider(provider.clone());

    let (status, _) = app
        .post_json(
            "/send-topic-notification",
            json!({"topic": "deals", "type": "product_detail", "productId": 4}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let sent = provider.sent();
    assert_eq!(sent[0].data["type"], "product_detail");
    assert_eq!(sent[0].data["product_id"], "4");
    assert_eq!(sent[0].data["product_title"], "Sun Protection Plus");
    assert_eq!(sent[0].data["product_price"], "¥4,200");
}

#[tokio::test]
async fn topic_product_fields_need_product_detail_type() {
    let provider = RecordingPushProvider::new();
    let app = TestApp::with_provider(provider.clone());

    let (status, body) = app
        .post_json(
            "/send-topic-notification",
            json!({"topic": "deals", "type": "promo", "productId": 4}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let sent = provider.sent();
    assert_eq!(sent[0].data["type"], "promo");
    assert!(!sent[0].data.contains_key("product_id"));
    assert!(!sent[0].data.contains_key("product_title"));
}

#[tokio::test]
async fn topic_ignores_unknown_product() {
    let provider = RecordingPushProvider::new();
    let app = TestApp::with_provider(provider.clone());

    let (status, body) = app
        .post_json(
            "/send-topic-notification",
            json!({"topic": "deals", "type": "product_detail", "productId": 99}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let sent = provider.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].data["type"], "product_detail");
    assert!(!sent[0].data.contains_key("product_id"));
    assert!(!sent[0].data.contains_key("product_title"));
    assert!(!sent[0].data.contains_key("product_price"));
}

#[tokio::test]
async fn missing_topic_is_rejected() {
    let provider = RecordingPushProvider::new();
    let app = TestApp::with_provider(provider.clone());

    let (status, body) = app
        .post_json("/send-topic-notification", json!({"title": "x"}))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Topic is required");
    assert!(provider.sent().is_empty());
}

// =============================================================================
// Test notification
// =============================================================================

#[tokio::test]
async fn test_notification_sends_home_then_product() {
    let provider = RecordingPushProvider::new();
    let app = TestApp::with_provider(provider.clone());
    let catalog = Catalog::seeded();

    let (status, body) = app
        .post_json("/test-notification", json!({"token": "t1"}))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Test notifications sent successfully");

    let results = &body["results"];
    assert_ne!(results["home"], results["product"]);
    let tested_id = results["testedProduct"]["id"].as_i64().unwrap();
    let tested = catalog
        .products()
        .iter()
        .find(|p| p.id == tested_id)
        .expect("tested product must come from the catalog");

    let sent = provider.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].data["type"], "home");
    assert_eq!(sent[0].title, "🏠 Test Home Notification");
    assert_eq!(sent[1].data["type"], "product_detail");
    assert_eq!(sent[1].data["product_id"], tested_id.to_string());
    assert_eq!(
        sent[1].body,
        format!("Check out {} - {}", tested.title, tested.price)
    );
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn provider_failure_surfaces_message() {
    let provider =
        RecordingPushProvider::failing("The registration token is not a valid FCM registration token");
    let app = TestApp::with_provider(provider.clone());

    let (status, body) = app
        .post_json("/send-home-notification", json!({"token": "bad"}))
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(
        body["error"],
        "The registration token is not a valid FCM registration token"
    );
}

#[tokio::test]
async fn test_notification_stops_after_first_failure() {
    let provider = RecordingPushProvider::failing("quota exceeded");
    let app = TestApp::with_provider(provider.clone());

    let (status, body) = app
        .post_json("/test-notification", json!({"token": "t1"}))
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "quota exceeded");
    assert_eq!(provider.sent().len(), 1);
}

#[tokio::test]
async fn panics_become_generic_500() {
    let app = TestApp::with_provider(Arc::new(PanickingPushProvider));

    let (status, body) = app
        .post_json("/send-home-notification", json!({"token": "t1"}))
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Internal server error");
}

#[tokio::test]
async fn request_id_is_echoed() {
    let app = TestApp::with_provider(RecordingPushProvider::new());

    let response = tower::util::ServiceExt::oneshot(
        app.router.clone(),
        axum::http::Request::builder()
            .uri("/products")
            .header("x-request-id", "req-123")
            .body(axum::body::Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-123");
}
