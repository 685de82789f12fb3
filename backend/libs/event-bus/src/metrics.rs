//! Prometheus counters for publish and dispatch outcomes.

use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

lazy_static::lazy_static! {
    /// Events handed to the broker, labelled `outcome` = ok | error
    pub static ref EVENT_PUBLISH_TOTAL: IntCounterVec = register_int_counter_vec!(
        "event_publish_total",
        "Total number of events published per topic",
        &["topic", "outcome"]
    )
    .expect("event_publish_total metric registration");

    /// Records consumed, labelled `outcome` = handled | failed | unrouted
    pub static ref EVENT_DISPATCH_TOTAL: IntCounterVec = register_int_counter_vec!(
        "event_dispatch_total",
        "Total number of consumed records per topic and dispatch outcome",
        &["topic", "outcome"]
    )
    .expect("event_dispatch_total metric registration");
}

pub(crate) fn record_publish(topic: &str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    EVENT_PUBLISH_TOTAL.with_label_values(&[topic, outcome]).inc();
}

pub(crate) fn record_dispatch(topic: &str, outcome: &str) {
    EVENT_DISPATCH_TOTAL
        .with_label_values(&[topic, outcome])
        .inc();
}

/// Render the default registry in the Prometheus text format, for `/metrics` handlers.
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
