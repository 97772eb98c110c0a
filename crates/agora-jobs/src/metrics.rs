//! Metrics for the flush scheduler and the shutdown drain.

use metrics::{counter, describe_counter, describe_gauge, gauge};

/// Metric names for background like sync.
pub mod names {
    /// Scheduler ticks fired.
    pub const SYNC_TICKS_TOTAL: &str = "agora_like_sync_ticks_total";
    /// Ticks skipped because a flush was still running.
    pub const SYNC_SKIPPED_TICKS_TOTAL: &str = "agora_like_sync_skipped_ticks_total";
    /// Scheduled flushes that failed as a whole.
    pub const SYNC_FAILURES_TOTAL: &str = "agora_like_sync_failures_total";
    /// Whether the scheduler loop is running.
    pub const SYNC_RUNNING: &str = "agora_like_sync_running";
    /// Shutdown drains executed.
    pub const DRAINS_TOTAL: &str = "agora_like_drains_total";
}

/// Register all metric descriptions.
pub fn register_metrics() {
    describe_counter!(names::SYNC_TICKS_TOTAL, "Total number of scheduler ticks");
    describe_counter!(
        names::SYNC_SKIPPED_TICKS_TOTAL,
        "Total number of ticks skipped because a flush was in progress"
    );
    describe_counter!(
        names::SYNC_FAILURES_TOTAL,
        "Total number of scheduled flushes that failed"
    );
    describe_gauge!(
        names::SYNC_RUNNING,
        "Whether the like sync scheduler is running (1) or not (0)"
    );
    describe_counter!(names::DRAINS_TOTAL, "Total number of shutdown drains, by result");

    agora_service::metrics::register_metrics();
}

/// Sync metrics recorder.
#[derive(Clone)]
pub struct SyncMetrics;

impl SyncMetrics {
    /// Record a tick.
    pub fn tick() {
        counter!(names::SYNC_TICKS_TOTAL).increment(1);
    }

    /// Record a skipped tick.
    pub fn tick_skipped() {
        counter!(names::SYNC_SKIPPED_TICKS_TOTAL).increment(1);
    }

    /// Record a failed scheduled flush.
    pub fn flush_failed() {
        counter!(names::SYNC_FAILURES_TOTAL).increment(1);
    }

    /// Set the running gauge.
    pub fn set_running(running: bool) {
        gauge!(names::SYNC_RUNNING).set(if running { 1.0 } else { 0.0 });
    }

    /// Record a drain and whether it succeeded.
    pub fn drained(success: bool) {
        counter!(
            names::DRAINS_TOTAL,
            "result" => if success { "success" } else { "failure" }
        )
        .increment(1);
    }
}
