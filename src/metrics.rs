// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for DNS-01 providers.
//!
//! All metrics use the `dns01` namespace prefix and are labelled by provider
//! name, so one process hosting several providers can tell them apart.
//!
//! # Example
//!
//! ```rust
//! use dns01_providers::metrics::{gather_metrics, record_operation_success};
//!
//! record_operation_success("godaddy", "present", std::time::Duration::from_millis(350));
//! assert!(gather_metrics().unwrap().contains("dns01_operations_total"));
//! ```

use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::LazyLock;
use std::time::Duration;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all metrics
const METRICS_NAMESPACE: &str = "dns01";

/// Operation label for `present`
pub const OPERATION_PRESENT: &str = "present";

/// Operation label for `cleanup`
pub const OPERATION_CLEANUP: &str = "cleanup";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Operation Metrics
// ============================================================================

/// Total number of provider operations by outcome
///
/// Labels:
/// - `provider`: Registry name of the provider
/// - `operation`: `present` or `cleanup`
/// - `status`: `success` or `error`
pub static OPERATIONS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_operations_total"),
        "Total number of DNS-01 provider operations by provider, operation and status",
    );
    let counter = CounterVec::new(opts, &["provider", "operation", "status"])
        .expect("operations counter definition is valid");
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .expect("operations counter is registered once");
    counter
});

/// Duration of provider operations in seconds
///
/// Labels:
/// - `provider`: Registry name of the provider
/// - `operation`: `present` or `cleanup`
pub static OPERATION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_operation_duration_seconds"),
        "Duration of DNS-01 provider operations in seconds",
    )
    .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]);
    let histogram = HistogramVec::new(opts, &["provider", "operation"])
        .expect("duration histogram definition is valid");
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .expect("duration histogram is registered once");
    histogram
});

// ============================================================================
// Error Metrics
// ============================================================================

/// Total number of provider errors by reason code
///
/// Labels:
/// - `provider`: Registry name of the provider
/// - `reason`: Stable reason code from `ProviderError::reason`
pub static ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_errors_total"),
        "Total number of DNS-01 provider errors by provider and reason",
    );
    let counter = CounterVec::new(opts, &["provider", "reason"])
        .expect("errors counter definition is valid");
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .expect("errors counter is registered once");
    counter
});

// ============================================================================
// Lifecycle Metrics
// ============================================================================

/// Challenge records currently presented and not yet cleaned up
///
/// Labels:
/// - `provider`: Registry name of the provider
pub static RECORDS_TRACKED: LazyLock<GaugeVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_records_tracked"),
        "Challenge records presented and awaiting cleanup by provider",
    );
    let gauge =
        GaugeVec::new(opts, &["provider"]).expect("tracked records gauge definition is valid");
    METRICS_REGISTRY
        .register(Box::new(gauge.clone()))
        .expect("tracked records gauge is registered once");
    gauge
});

// ============================================================================
// Recording Functions
// ============================================================================

/// Record a successful operation
///
/// # Arguments
/// * `provider` - Registry name of the provider
/// * `operation` - `present` or `cleanup`
/// * `duration` - Time spent in the operation
pub fn record_operation_success(provider: &str, operation: &str, duration: Duration) {
    OPERATIONS_TOTAL
        .with_label_values(&[provider, operation, "success"])
        .inc();
    OPERATION_DURATION_SECONDS
        .with_label_values(&[provider, operation])
        .observe(duration.as_secs_f64());
}

/// Record a failed operation
///
/// # Arguments
/// * `provider` - Registry name of the provider
/// * `operation` - `present` or `cleanup`
/// * `reason` - Stable reason code of the error
/// * `duration` - Time spent before the failure
pub fn record_operation_error(provider: &str, operation: &str, reason: &str, duration: Duration) {
    OPERATIONS_TOTAL
        .with_label_values(&[provider, operation, "error"])
        .inc();
    OPERATION_DURATION_SECONDS
        .with_label_values(&[provider, operation])
        .observe(duration.as_secs_f64());
    ERRORS_TOTAL.with_label_values(&[provider, reason]).inc();
}

/// Record a record entering the lifecycle tracker
pub fn record_tracked(provider: &str) {
    RECORDS_TRACKED.with_label_values(&[provider]).inc();
}

/// Record a record leaving the lifecycle tracker
pub fn record_untracked(provider: &str) {
    RECORDS_TRACKED.with_label_values(&[provider]).dec();
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
