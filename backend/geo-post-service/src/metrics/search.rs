use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec,
};

use crate::db::StoreBackend;

lazy_static! {
    /// Search requests by retrieval path and outcome (ok or error kind).
    pub static ref SEARCH_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "geo_search_requests_total",
        "Post retrieval requests segmented by path and outcome",
        &["path", "outcome"]
    )
    .expect("failed to register geo_search_requests_total");

    /// End-to-end duration of a retrieval path, storage calls included.
    pub static ref SEARCH_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "geo_search_duration_seconds",
        "Post retrieval duration segmented by path",
        &["path"]
    )
    .expect("failed to register geo_search_duration_seconds");

    /// Radius query candidates before (prefilter) and after (kept) the exact distance test.
    pub static ref NEARBY_CANDIDATES: HistogramVec = register_histogram_vec!(
        "geo_nearby_candidates",
        "Radius query candidates segmented by backend and stage",
        &["backend", "stage"],
        vec![0.0, 1.0, 10.0, 50.0, 100.0, 500.0, 1000.0, 5000.0, 20000.0]
    )
    .expect("failed to register geo_nearby_candidates");
}

pub fn record_request(path: &str, outcome: &str, elapsed_secs: f64) {
    SEARCH_REQUESTS_TOTAL
        .with_label_values(&[path, outcome])
        .inc();
    SEARCH_DURATION_SECONDS
        .with_label_values(&[path])
        .observe(elapsed_secs);
}

pub fn record_nearby_candidates(backend: StoreBackend, prefiltered: usize, kept: usize) {
    NEARBY_CANDIDATES
        .with_label_values(&[backend.as_str(), "prefilter"])
        .observe(prefiltered as f64);
    NEARBY_CANDIDATES
        .with_label_values(&[backend.as_str(), "kept"])
        .observe(kept as f64);
}
