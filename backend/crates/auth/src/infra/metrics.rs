//! Persistence Observability
//!
//! Histogram of persistence operation latency, labelled with the backend,
//! the operation name and the outcome. Recording is fire-and-forget: it
//! never blocks and never fails the calling operation.

use std::time::Duration;

use lazy_static::lazy_static;
use prometheus::{HistogramVec, register_histogram_vec};

lazy_static! {
    static ref DB_QUERIES: HistogramVec = register_histogram_vec!(
        "auth_db_query_duration_seconds",
        "Persistence operation latency by backend, operation and outcome",
        &["database", "name", "error"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("register db query histogram");
}

/// Record one persistence operation observation.
///
/// `error` is a stable low-cardinality label; empty string marks success.
pub(crate) fn observe_db(name: &str, error: &str, duration: Duration) {
    DB_QUERIES
        .with_label_values(&["postgres", name, error])
        .observe(duration.as_secs_f64());
}
