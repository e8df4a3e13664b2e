use notification_server::config::NotificationConfig;
use notification_server::services::init_metrics;
use notification_server::startup::Application;
use service_core::observability::init_tracing;
use tokio::signal;

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = NotificationConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing(
        "notification-server",
        &config.common.log_level,
        config.common.otlp_endpoint.as_deref(),
    );

    if let Err(e) = init_metrics() {
        tracing::warn!("Metrics disabled: {:#}", e);
    }

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to start notification server: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    tracing::info!(
        "Houzou Medical Notification Server running on port {}",
        app.port()
    );

    app.run_until(shutdown_signal()).await
}
