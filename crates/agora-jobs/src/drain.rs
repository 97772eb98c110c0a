//! Final flush during graceful shutdown.

use crate::error::JobResult;
use crate::metrics::SyncMetrics;
use agora_service::{FlushReport, LikeService};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// One-shot flush run while the process shuts down.
///
/// Call it after the scheduler has stopped. It waits for any flush still in
/// progress, then runs its own so that toggles made since are not lost.
pub struct ShutdownDrain {
    service: Arc<dyn LikeService>,
    drained: AtomicBool,
}

impl ShutdownDrain {
    /// Create a drain for the given service.
    pub fn new(service: Arc<dyn LikeService>) -> Self {
        Self {
            service,
            drained: AtomicBool::new(false),
        }
    }

    /// Whether the drain has already been run.
    pub fn has_run(&self) -> bool {
        self.drained.load(Ordering::SeqCst)
    }

    /// Runs the final flush.
    ///
    /// Only the first call flushes; later calls return `Ok(None)`. A failed
    /// drain is not retried.
    pub async fn run(&self) -> JobResult<Option<FlushReport>> {
        if self.drained.swap(true, Ordering::SeqCst) {
            debug!("Shutdown drain already ran");
            return Ok(None);
        }

        info!("Draining like cache before shutdown...");
        let started = Instant::now();

        match self.service.flush_all().await {
            Ok(report) => {
                SyncMetrics::drained(true);
                info!(
                    flushed = report.flushed,
                    failed = report.failed,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Like cache drained"
                );
                Ok(Some(report))
            }
            Err(e) => {
                SyncMetrics::drained(false);
                error!(error = %e, "Shutdown drain failed; unflushed likes remain in the cache");
                Err(e.into())
            }
        }
    }
}

impl std::fmt::Debug for ShutdownDrain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownDrain")
            .field("drained", &self.has_run())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JobError;
    use crate::scheduler::tests::SlowFlushService;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test(start_paused = true)]
    async fn test_drain_runs_once() {
        let service = Arc::new(SlowFlushService::new(Duration::from_millis(10)));
        let drain = ShutdownDrain::new(service.clone());

        let first = assert_ok!(drain.run().await);
        assert_eq!(first.map(|r| r.flushed), Some(1));
        assert!(drain.has_run());

        assert_eq!(assert_ok!(drain.run().await), None);
        assert_eq!(service.flushes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_waits_for_running_flush() {
        let service = Arc::new(SlowFlushService::new(Duration::from_secs(5)));

        let scheduled = tokio::spawn({
            let service = service.clone();
            async move { service.try_flush_all().await }
        });
        tokio::task::yield_now().await;

        let drain = ShutdownDrain::new(service.clone());
        let report = assert_ok!(drain.run().await);
        assert!(report.is_some());

        let scheduled = assert_ok!(scheduled.await.unwrap());
        assert!(scheduled.is_some());
        assert_eq!(service.flushes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_drain_is_not_retried() {
        let service = Arc::new(SlowFlushService::new(Duration::from_millis(10)));
        service.fail_flushes();
        let drain = ShutdownDrain::new(service.clone());

        let err = assert_err!(drain.run().await);
        assert!(matches!(err, JobError::Flush(_)));
        assert!(err.is_retryable());
        assert_eq!(assert_ok!(drain.run().await), None);
    }
}
