//! Metrics collection for the notification server.
//!
//! HTTP request metrics come from the `metrics` facade (see
//! `service_core::middleware::metrics`); notification and provider counters
//! live in a dedicated Prometheus registry. Both are rendered by `/metrics`.

use anyhow::Context;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
pub static PROMETHEUS_REGISTRY: OnceLock<Registry> = OnceLock::new();
pub static NOTIFICATION_SENT_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static NOTIFICATION_PROVIDER_CALLS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Install the global recorder and register the custom counters.
///
/// Must be called at most once per process. Until it is called every
/// `record_*` function is a no-op.
pub fn init_metrics() -> anyhow::Result<()> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install Prometheus recorder")?;

    if METRICS_HANDLE.set(handle).is_err() {
        anyhow::bail!("metrics already initialized");
    }

    let registry = Registry::new();

    let notifications_counter = IntCounterVec::new(
        Opts::new(
            "notification_sent_total",
            "Total notifications sent by kind and status",
        ),
        &["kind", "status"],
    )
    .context("failed to create notification_sent_total")?;

    let provider_calls_counter = IntCounterVec::new(
        Opts::new(
            "notification_provider_calls_total",
            "Total provider API calls by provider and status",
        ),
        &["provider", "status"],
    )
    .context("failed to create notification_provider_calls_total")?;

    registry
        .register(Box::new(notifications_counter.clone()))
        .context("failed to register notification_sent_total")?;
    registry
        .register(Box::new(provider_calls_counter.clone()))
        .context("failed to register notification_provider_calls_total")?;

    // The handle guard above makes these first-time sets.
    let _ = PROMETHEUS_REGISTRY.set(registry);
    let _ = NOTIFICATION_SENT_TOTAL.set(notifications_counter);
    let _ = NOTIFICATION_PROVIDER_CALLS_TOTAL.set(provider_calls_counter);

    Ok(())
}

/// Everything `/metrics` serves: the HTTP recorder's rendering followed by
/// the notification registry.
pub fn get_metrics() -> String {
    let mut output = match METRICS_HANDLE.get() {
        Some(handle) => handle.render(),
        None => "# Metrics recorder not initialized\n".to_string(),
    };
    if let Some(text) = PROMETHEUS_REGISTRY.get().and_then(encode_registry) {
        output.push_str(&text);
    }
    output
}

fn encode_registry(registry: &Registry) -> Option<String> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&registry.gather(), &mut buffer)
        .ok()?;
    String::from_utf8(buffer).ok()
}

/// Record the outcome of one notification route.
pub fn record_notification(kind: &str, status: &str) {
    if let Some(counter) = NOTIFICATION_SENT_TOTAL.get() {
        counter.with_label_values(&[kind, status]).inc();
    }
}

/// Record a provider API call.
pub fn record_provider_call(provider: &str, status: &str) {
    if let Some(counter) = NOTIFICATION_PROVIDER_CALLS_TOTAL.get() {
        counter.with_label_values(&[provider, status]).inc();
    }
}
