//! Application startup and lifecycle management.

use crate::config::{FcmConfig, NotificationConfig};
use crate::handlers::{
    health_check, index, list_products, metrics_endpoint, not_found, send_home_notification,
    send_product_notification, send_topic_notification, test_notification,
};
use crate::services::{Catalog, FcmProvider, MockPushProvider, PushProvider};
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    panic::handle_panic,
    tracing::{request_id, request_id_middleware},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub push_provider: Arc<dyn PushProvider>,
}

impl AppState {
    pub fn new(catalog: Catalog, push_provider: Arc<dyn PushProvider>) -> Self {
        Self {
            catalog: Arc::new(catalog),
            push_provider,
        }
    }
}

/// Pick the push provider for `config`: FCM when enabled, otherwise the mock.
///
/// Enabled FCM with unreadable credentials is a startup error.
pub fn build_push_provider(config: &FcmConfig) -> Result<Arc<dyn PushProvider>, AppError> {
    if !config.enabled {
        tracing::info!("FCM provider disabled, using mock push provider");
        return Ok(Arc::new(MockPushProvider::new()));
    }

    let provider = FcmProvider::new(config.clone()).map_err(|e| {
        tracing::error!("Failed to initialize FCM provider: {}", e);
        AppError::ConfigError(anyhow::anyhow!(e))
    })?;

    tracing::info!(project_id = %provider.project_id(), "FCM push provider initialized");
    Ok(Arc::new(provider))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_endpoint))
        .route("/products", get(list_products))
        .route("/send-home-notification", post(send_home_notification))
        .route("/send-product-notification", post(send_product_notification))
        .route("/send-topic-notification", post(send_topic_notification))
        .route("/test-notification", post(test_notification))
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    request_id = %request_id(request),
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(CorsLayer::permissive())
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: NotificationConfig) -> Result<Self, AppError> {
        let push_provider = build_push_provider(&config.fcm)?;
        Self::build_with_provider(config, push_provider).await
    }

    /// Build with an already constructed provider.
    pub async fn build_with_provider(
        config: NotificationConfig,
        push_provider: Arc<dyn PushProvider>,
    ) -> Result<Self, AppError> {
        let catalog = Catalog::seeded();
        tracing::info!(products = catalog.products().len(), "Product catalog loaded");

        let state = AppState::new(catalog, push_provider);

        // Port 0 picks a random port, which tests rely on.
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Notification server listening on port {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run until the shutdown future resolves.
    pub async fn run_until<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let router = build_router(self.state);
        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                std::io::Error::other(format!("HTTP server error: {}", e))
            })
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.run_until(std::future::pending()).await
    }
}
