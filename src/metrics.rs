//! Metrics about the dashboard itself, separate from the pod metrics it serves.

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_histogram_vec, register_int_counter, register_int_counter_vec,
    Encoder, Histogram, HistogramVec, IntCounter, IntCounterVec, TextEncoder,
};
use std::time::Instant;

lazy_static! {
    // Request metrics
    pub static ref REQUEST_COUNTER: IntCounterVec = register_int_counter_vec!(
        "dashboard_requests_total",
        "Total number of dashboard requests received",
        &["endpoint"]
    ).unwrap();

    pub static ref REQUEST_DURATION: HistogramVec = register_histogram_vec!(
        "dashboard_request_duration_seconds",
        "Dashboard request duration in seconds",
        &["endpoint"],
        vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0]
    ).unwrap();

    // Upstream metrics
    pub static ref UPSTREAM_QUERIES: IntCounterVec = register_int_counter_vec!(
        "upstream_queries_total",
        "Queries sent to the metrics database, by outcome",
        &["outcome"]
    ).unwrap();

    pub static ref UPSTREAM_QUERY_DURATION: Histogram = register_histogram!(
        "upstream_query_duration_seconds",
        "Metrics database round trip in seconds",
        vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0]
    ).unwrap();

    pub static ref SAMPLE_PARSE_FAILURES: IntCounter = register_int_counter!(
        "sample_parse_failures_total",
        "Samples whose value could not be parsed as a float"
    ).unwrap();
}

/// Registers every collector with the default registry.
pub fn init_metrics() {
    lazy_static::initialize(&REQUEST_COUNTER);
    lazy_static::initialize(&REQUEST_DURATION);
    lazy_static::initialize(&UPSTREAM_QUERIES);
    lazy_static::initialize(&UPSTREAM_QUERY_DURATION);
    lazy_static::initialize(&SAMPLE_PARSE_FAILURES);
}

/// Records one request against `endpoint` and its duration when dropped.
pub struct RequestTimer {
    endpoint: &'static str,
    start: Instant,
}

impl RequestTimer {
    pub fn new(endpoint: &'static str) -> Self {
        REQUEST_COUNTER.with_label_values(&[endpoint]).inc();
        Self {
            endpoint,
            start: Instant::now(),
        }
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        REQUEST_DURATION
            .with_label_values(&[self.endpoint])
            .observe(duration);
    }
}

pub fn record_upstream_query(success: bool, duration: f64) {
    let outcome = if success { "success" } else { "transport_error" };
    UPSTREAM_QUERIES.with_label_values(&[outcome]).inc();
    UPSTREAM_QUERY_DURATION.observe(duration);
}

pub fn record_parse_failure() {
    SAMPLE_PARSE_FAILURES.inc();
}

/// Everything in the default registry, in the Prometheus text format.
pub fn render() -> Result<String, prometheus::Error> {
    init_metrics();
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&prometheus::gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
