//! Prometheus Metrics Module
//!
//! Provides application-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - HTTP request counts by method, route, and status
//! - HTTP request latency histograms
//! - Accepted and rejected documents by kind
//! - Active chat stream gauge

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

const NAMESPACE: &str = "rp_server";

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// HTTP request counter - tracks total requests by method, route, and status code
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests").namespace(NAMESPACE),
        &["method", "path", "status"],
    )
    .expect("Failed to create HTTP_REQUESTS_TOTAL metric")
});

/// HTTP request latency histogram - tracks request duration in seconds
pub static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let buckets = vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0];
    HistogramVec::new(
        HistogramOpts::new("http_request_duration_seconds", "HTTP request latency in seconds")
            .namespace(NAMESPACE)
            .buckets(buckets),
        &["method", "path"],
    )
    .expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric")
});

/// Documents that passed the whole pipeline and were persisted
pub static DOCUMENTS_ACCEPTED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("documents_accepted_total", "Documents persisted").namespace(NAMESPACE),
        &["kind"],
    )
    .expect("Failed to create DOCUMENTS_ACCEPTED_TOTAL metric")
});

/// Documents rejected by decoding, validation or relation checks
pub static DOCUMENTS_REJECTED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("documents_rejected_total", "Documents rejected before persisting")
            .namespace(NAMESPACE),
        &["kind", "reason"],
    )
    .expect("Failed to create DOCUMENTS_REJECTED_TOTAL metric")
});

/// Open chat stream connections
pub static CHAT_STREAMS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new("chat_streams_active", "Number of open chat streams").namespace(NAMESPACE),
    )
    .expect("Failed to create CHAT_STREAMS_ACTIVE metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .expect("Failed to register HTTP_REQUESTS_TOTAL");
    registry
        .register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))
        .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");
    registry
        .register(Box::new(DOCUMENTS_ACCEPTED_TOTAL.clone()))
        .expect("Failed to register DOCUMENTS_ACCEPTED_TOTAL");
    registry
        .register(Box::new(DOCUMENTS_REJECTED_TOTAL.clone()))
        .expect("Failed to register DOCUMENTS_REJECTED_TOTAL");
    registry
        .register(Box::new(CHAT_STREAMS_ACTIVE.clone()))
        .expect("Failed to register CHAT_STREAMS_ACTIVE");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Helper to record HTTP request metrics
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration_secs);
}

/// Helper to record a persisted document
pub fn record_document_accepted(kind: &str) {
    DOCUMENTS_ACCEPTED_TOTAL.with_label_values(&[kind]).inc();
}

/// Helper to record a rejected document
pub fn record_document_rejected(kind: &str, reason: &str) {
    DOCUMENTS_REJECTED_TOTAL.with_label_values(&[kind, reason]).inc();
}

/// Guard that keeps the chat stream gauge raised while alive
pub struct ChatStreamGuard(());

impl ChatStreamGuard {
    pub fn open() -> Self {
        CHAT_STREAMS_ACTIVE.inc();
        Self(())
    }
}

impl Drop for ChatStreamGuard {
    fn drop(&mut self) {
        CHAT_STREAMS_ACTIVE.dec();
    }
}
