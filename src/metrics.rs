//! Prometheus metrics for request latency and catalog activity.
//!
//! This module provides metrics for:
//! - HTTP request latency per endpoint
//! - Catalog file load latency and failures
//! - Characters served and id lookup misses

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use strum::{Display, IntoStaticStr};
use tracing::debug;

use crate::error::Result;

// === Metric Name Constants ===

/// HTTP request latency metric name.
pub const METRIC_HTTP_REQUEST_LATENCY: &str = "http_request_latency_ms";
/// Catalog load latency metric name.
pub const METRIC_CATALOG_LOAD_LATENCY: &str = "catalog_load_latency_ms";
/// Catalog load failures counter metric name.
pub const METRIC_CATALOG_LOAD_FAILURES: &str = "catalog_load_failures_total";
/// Characters served counter metric name.
pub const METRIC_CHARACTERS_SERVED: &str = "characters_served_total";
/// Lookup misses counter metric name.
pub const METRIC_CHARACTER_NOT_FOUND: &str = "character_not_found_total";

/// API endpoints, used as the `endpoint` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Endpoint {
    /// `GET /api/characters`.
    ListCharacters,
    /// `GET /api/character/random`.
    RandomCharacter,
    /// `GET /api/character/:id`.
    CharacterById,
}

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_HTTP_REQUEST_LATENCY,
        "HTTP request latency in milliseconds"
    );
    describe_histogram!(
        METRIC_CATALOG_LOAD_LATENCY,
        "Time to read and parse the character file in milliseconds"
    );

    describe_counter!(
        METRIC_CATALOG_LOAD_FAILURES,
        "Total number of failed character file loads"
    );
    describe_counter!(
        METRIC_CHARACTERS_SERVED,
        "Total number of character records returned"
    );
    describe_counter!(
        METRIC_CHARACTER_NOT_FOUND,
        "Total number of id lookups that matched nothing"
    );

    debug!("Metrics initialized");
}

/// Install the global Prometheus recorder and describe all metrics.
pub fn install_prometheus() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    init_metrics();
    Ok(handle)
}

/// Record HTTP request latency.
pub fn record_http_latency(start: Instant, endpoint: Endpoint) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    let label: &'static str = endpoint.into();
    histogram!(METRIC_HTTP_REQUEST_LATENCY, "endpoint" => label).record(latency_ms);
}

/// Record catalog load latency.
pub fn record_catalog_load_latency(start: Instant) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_CATALOG_LOAD_LATENCY).record(latency_ms);
}

/// Increment catalog load failures counter.
pub fn inc_catalog_load_failures() {
    counter!(METRIC_CATALOG_LOAD_FAILURES).increment(1);
}

/// Add to the characters served counter.
pub fn add_characters_served(count: usize) {
    counter!(METRIC_CHARACTERS_SERVED).increment(count as u64);
}

/// Increment lookup misses counter.
pub fn inc_character_not_found() {
    counter!(METRIC_CHARACTER_NOT_FOUND).increment(1);
}

/// RAII guard for timing a request.
/// Records latency for its endpoint when dropped.
pub struct RequestTimer {
    start: Instant,
    endpoint: Endpoint,
}

impl RequestTimer {
    /// Start timing a request to `endpoint`.
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            start: Instant::now(),
            endpoint,
        }
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        record_http_latency(self.start, self.endpoint);
    }
}
