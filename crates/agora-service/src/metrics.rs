//! Metrics for the like cache.

use agora_core::ContentKind;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;

/// Metric names for the like cache.
pub mod names {
    /// Toggles served, labelled by kind and resulting state.
    pub const LIKE_TOGGLES_TOTAL: &str = "agora_like_toggles_total";
    /// Like-sets copied from the durable store into the cache.
    pub const LIKE_HYDRATIONS_TOTAL: &str = "agora_like_hydrations_total";
    /// Hydrations rolled back after a durable read failed.
    pub const LIKE_HYDRATION_FAILURES_TOTAL: &str = "agora_like_hydration_failures_total";

    /// Completed flush passes.
    pub const LIKE_FLUSHES_TOTAL: &str = "agora_like_flushes_total";
    /// Like-sets visited by flush passes, labelled by outcome.
    pub const LIKE_FLUSH_ITEMS_TOTAL: &str = "agora_like_flush_items_total";
    /// Flush pass duration in seconds.
    pub const LIKE_FLUSH_DURATION_SECONDS: &str = "agora_like_flush_duration_seconds";
}

/// Register all metric descriptions.
pub fn register_metrics() {
    describe_counter!(
        names::LIKE_TOGGLES_TOTAL,
        "Total number of like toggles served from the cache"
    );
    describe_counter!(
        names::LIKE_HYDRATIONS_TOTAL,
        "Total number of like-sets hydrated from the database"
    );
    describe_counter!(
        names::LIKE_HYDRATION_FAILURES_TOTAL,
        "Total number of hydrations rolled back after a database error"
    );
    describe_counter!(
        names::LIKE_FLUSHES_TOTAL,
        "Total number of completed flush passes"
    );
    describe_counter!(
        names::LIKE_FLUSH_ITEMS_TOTAL,
        "Total number of like-sets visited by flush passes"
    );
    describe_histogram!(
        names::LIKE_FLUSH_DURATION_SECONDS,
        "Flush pass duration in seconds"
    );
}

/// Like cache metrics recorder.
#[derive(Clone)]
pub struct LikeMetrics;

impl LikeMetrics {
    /// Record a toggle and the state it produced.
    pub fn toggled(kind: ContentKind, liked: bool) {
        counter!(
            names::LIKE_TOGGLES_TOTAL,
            "kind" => kind.as_str(),
            "action" => if liked { "liked" } else { "unliked" }
        )
        .increment(1);
    }

    /// Record a completed hydration.
    pub fn hydrated(kind: ContentKind) {
        counter!(names::LIKE_HYDRATIONS_TOTAL, "kind" => kind.as_str()).increment(1);
    }

    /// Record a rolled-back hydration.
    pub fn hydration_failed(kind: ContentKind) {
        counter!(names::LIKE_HYDRATION_FAILURES_TOTAL, "kind" => kind.as_str()).increment(1);
    }

    /// Record one visited like-set.
    pub fn flush_item(kind: ContentKind, outcome: &'static str) {
        counter!(
            names::LIKE_FLUSH_ITEMS_TOTAL,
            "kind" => kind.as_str(),
            "outcome" => outcome
        )
        .increment(1);
    }

    /// Record a finished flush pass.
    pub fn flush_completed(duration: Duration) {
        counter!(names::LIKE_FLUSHES_TOTAL).increment(1);
        histogram!(names::LIKE_FLUSH_DURATION_SECONDS).record(duration.as_secs_f64());
    }
}
