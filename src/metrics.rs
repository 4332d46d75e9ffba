//! Prometheus metrics.
//!
//! Recording goes through the `metrics` facade and is a no-op until an
//! exporter is installed, so library users and tests pay nothing.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

const RESPONSES_TOTAL: &str = "mediagate_responses_total";
const STORE_LOOKUPS_TOTAL: &str = "mediagate_store_lookups_total";
const BYTES_SERVED_TOTAL: &str = "mediagate_bytes_served_total";
const REQUEST_DURATION_SECONDS: &str = "mediagate_request_duration_seconds";

/// Installs the Prometheus exporter with an HTTP listener on `addr`.
///
/// Must be called from within a tokio runtime.
///
/// # Errors
///
/// Returns an error if a recorder is already installed or the listener
/// cannot be bound.
pub fn install_exporter(addr: SocketAddr) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .with_context(|| format!("Failed to start metrics exporter on {addr}"))?;

    describe_counter!(RESPONSES_TOTAL, "Responses by status code");
    describe_counter!(STORE_LOOKUPS_TOTAL, "Store lookups by outcome");
    describe_counter!(BYTES_SERVED_TOTAL, "Body bytes promised in 200/206 responses");
    describe_histogram!(REQUEST_DURATION_SECONDS, "Time to produce response headers");

    Ok(())
}

/// Record one response by status code.
pub fn record_response(status: u16) {
    counter!(RESPONSES_TOTAL, "status" => status.to_string()).increment(1);
}

/// Record a store lookup outcome: `hit`, `miss`, or `error`.
pub fn record_lookup(outcome: &'static str) {
    counter!(STORE_LOOKUPS_TOTAL, "outcome" => outcome).increment(1);
}

/// Record body bytes about to be streamed.
pub fn record_bytes_served(bytes: u64) {
    counter!(BYTES_SERVED_TOTAL).increment(bytes);
}

/// Record the time taken to produce a response.
pub fn record_request_duration(seconds: f64) {
    histogram!(REQUEST_DURATION_SECONDS).record(seconds);
}
