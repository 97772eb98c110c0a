//! Periodic write-back of cached like-sets.

use crate::error::{JobError, JobResult};
use crate::metrics::SyncMetrics;
use crate::schedule::SyncSchedule;
use agora_service::{FlushReport, LikeService};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Scheduler statistics.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Scheduler ID.
    pub id: String,

    /// Whether the loop is running.
    pub running: bool,

    /// Ticks fired.
    pub ticks: u64,

    /// Flushes that completed.
    pub runs: u64,

    /// Ticks skipped because a flush was still running.
    pub skipped_ticks: u64,

    /// Flushes that failed as a whole.
    pub failures: u64,

    /// Report of the last completed flush.
    pub last_report: Option<FlushReport>,

    /// When the last completed flush finished.
    pub last_run_at: Option<DateTime<Utc>>,
}

/// Background task flushing the like cache on a [`SyncSchedule`].
///
/// Each tick hands the flush to its own task, so a slow flush never delays
/// the loop; a tick arriving while one is still running is dropped.
pub struct LikeSyncScheduler {
    /// Unique scheduler ID.
    id: String,

    /// Service whose cache is flushed.
    service: Arc<dyn LikeService>,

    /// When to fire.
    schedule: SyncSchedule,

    /// Shutdown flag. Latched once set, so a stop issued before the loop
    /// first polls it still ends the loop.
    shutdown_tx: watch::Sender<bool>,

    /// Receiver created with the channel; it has not seen the stop yet.
    shutdown_rx: watch::Receiver<bool>,

    /// Running flag.
    running: Arc<AtomicBool>,

    /// Counters shared with flush tasks.
    stats: Arc<RwLock<SyncStats>>,
}

impl LikeSyncScheduler {
    /// Create a new scheduler.
    pub fn new(service: Arc<dyn LikeService>, schedule: SyncSchedule) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let id = format!("like-sync-{}", Uuid::new_v4());

        Self {
            stats: Arc::new(RwLock::new(SyncStats {
                id: id.clone(),
                ..SyncStats::default()
            })),
            id,
            service,
            schedule,
            shutdown_tx,
            shutdown_rx,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get scheduler ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Check if the loop is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Snapshot of the scheduler statistics.
    pub fn stats(&self) -> SyncStats {
        let mut stats = self.stats.read().clone();
        stats.running = self.is_running();
        stats
    }

    /// Run the scheduler loop until [`LikeSyncScheduler::stop`] is called.
    ///
    /// A flush still in progress at shutdown is awaited before returning.
    /// Once stopped, the scheduler stays stopped: a later call returns at once.
    pub async fn start(&self) -> JobResult<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(JobError::Scheduler("Scheduler already running".to_string()));
        }

        info!(
            scheduler_id = %self.id,
            schedule = %self.schedule,
            "Starting like sync scheduler"
        );
        SyncMetrics::set_running(true);

        let mut shutdown_rx = self.shutdown_rx.clone();
        let mut ticker = self.schedule.ticker();
        let mut in_flight: Option<JoinHandle<()>> = None;

        loop {
            tokio::select! {
                biased;

                _ = shutdown_rx.changed() => {
                    info!(scheduler_id = %self.id, "Received shutdown signal");
                    break;
                }

                () = ticker.tick() => {
                    SyncMetrics::tick();
                    self.stats.write().ticks += 1;

                    if in_flight.as_ref().is_some_and(|task| !task.is_finished()) {
                        self.record_skip();
                        continue;
                    }
                    in_flight = Some(self.spawn_flush());
                }
            }
        }

        if let Some(task) = in_flight {
            if let Err(e) = task.await {
                warn!(error = %e, "Flush task ended abnormally during shutdown");
            }
        }

        self.running.store(false, Ordering::SeqCst);
        SyncMetrics::set_running(false);
        info!(scheduler_id = %self.id, "Like sync scheduler stopped");

        Ok(())
    }

    /// Stop the scheduler. Safe to call before the loop has started, or more
    /// than once.
    pub fn stop(&self) {
        if self.is_running() {
            info!(scheduler_id = %self.id, "Stopping like sync scheduler...");
        }
        self.shutdown_tx.send_replace(true);
    }

    fn record_skip(&self) {
        debug!(scheduler_id = %self.id, "Flush still running, skipping tick");
        SyncMetrics::tick_skipped();
        self.stats.write().skipped_ticks += 1;
    }

    fn spawn_flush(&self) -> JoinHandle<()> {
        let service = Arc::clone(&self.service);
        let stats = Arc::clone(&self.stats);
        let scheduler_id = self.id.clone();

        tokio::spawn(async move {
            match service.try_flush_all().await {
                Ok(Some(report)) => {
                    let mut stats = stats.write();
                    stats.runs += 1;
                    stats.last_report = Some(report);
                    stats.last_run_at = Some(Utc::now());
                }
                Ok(None) => {
                    // Another caller, such as a manual flush, holds the lock.
                    debug!(scheduler_id = %scheduler_id, "Flush already in progress elsewhere, skipping tick");
                    SyncMetrics::tick_skipped();
                    stats.write().skipped_ticks += 1;
                }
                Err(e) => {
                    error!(scheduler_id = %scheduler_id, error = %e, "Scheduled like flush failed");
                    SyncMetrics::flush_failed();
                    stats.write().failures += 1;
                }
            }
        })
    }
}

impl std::fmt::Debug for LikeSyncScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LikeSyncScheduler")
            .field("id", &self.id)
            .field("schedule", &self.schedule)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use agora_core::{AgoraError, AgoraResult, ContentId, ContentKind, UserId};
    use async_trait::async_trait;
    use std::collections::BTreeSet;
    use std::sync::atomic::AtomicU64;
    use std::time::Duration;
    use tokio::sync::Mutex;
    use tokio_test::{assert_err, assert_ok};

    /// Like service whose flush takes a fixed amount of (virtual) time.
    pub(crate) struct SlowFlushService {
        flush_lock: Mutex<()>,
        flush_time: Duration,
        pub(crate) flushes: AtomicU64,
        fail: AtomicBool,
    }

    impl SlowFlushService {
        pub(crate) fn new(flush_time: Duration) -> Self {
            Self {
                flush_lock: Mutex::new(()),
                flush_time,
                flushes: AtomicU64::new(0),
                fail: AtomicBool::new(false),
            }
        }

        pub(crate) fn fail_flushes(&self) {
            self.fail.store(true, Ordering::SeqCst);
        }

        async fn flush_locked(&self) -> AgoraResult<FlushReport> {
            tokio::time::sleep(self.flush_time).await;
            if self.fail.load(Ordering::SeqCst) {
                return Err(AgoraError::cache("connection refused"));
            }
            self.flushes.fetch_add(1, Ordering::SeqCst);
            Ok(FlushReport {
                flushed: 1,
                ..FlushReport::default()
            })
        }
    }

    #[async_trait]
    impl LikeService for SlowFlushService {
        async fn like_count(&self, _kind: ContentKind, _id: ContentId) -> AgoraResult<u64> {
            Ok(0)
        }

        async fn likers(&self, _kind: ContentKind, _id: ContentId) -> AgoraResult<BTreeSet<UserId>> {
            Ok(BTreeSet::new())
        }

        async fn is_liked(&self, _kind: ContentKind, _id: ContentId, _user: UserId) -> AgoraResult<bool> {
            Ok(false)
        }

        async fn toggle_like(&self, _kind: ContentKind, _id: ContentId, _user: UserId) -> AgoraResult<bool> {
            Ok(true)
        }

        async fn flush_all(&self) -> AgoraResult<FlushReport> {
            let _guard = self.flush_lock.lock().await;
            self.flush_locked().await
        }

        async fn try_flush_all(&self) -> AgoraResult<Option<FlushReport>> {
            let Ok(_guard) = self.flush_lock.try_lock() else {
                return Ok(None);
            };
            self.flush_locked().await.map(Some)
        }
    }

    fn scheduler(service: Arc<SlowFlushService>, period_secs: u64) -> Arc<LikeSyncScheduler> {
        let schedule = SyncSchedule::every(Duration::from_secs(period_secs)).unwrap();
        Arc::new(LikeSyncScheduler::new(service, schedule))
    }

    async fn run_for(scheduler: &Arc<LikeSyncScheduler>, virtual_secs: u64) -> JobResult<()> {
        let handle = tokio::spawn({
            let scheduler = Arc::clone(scheduler);
            async move { scheduler.start().await }
        });
        tokio::time::sleep(Duration::from_secs(virtual_secs)).await;
        scheduler.stop();
        handle.await.unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_flushes_on_every_tick() {
        let service = Arc::new(SlowFlushService::new(Duration::from_millis(10)));
        let scheduler = scheduler(service.clone(), 10);

        assert_ok!(run_for(&scheduler, 35).await);

        let stats = scheduler.stats();
        assert_eq!(stats.ticks, 3);
        assert_eq!(stats.runs, 3);
        assert_eq!(stats.skipped_ticks, 0);
        assert_eq!(stats.last_report.map(|r| r.flushed), Some(1));
        assert!(!stats.running);
        assert_eq!(service.flushes.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_flush_waits_one_period() {
        let service = Arc::new(SlowFlushService::new(Duration::from_millis(10)));
        let scheduler = scheduler(service.clone(), 10);

        assert_ok!(run_for(&scheduler, 5).await);
        assert_eq!(scheduler.stats().ticks, 0);
        assert_eq!(service.flushes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_ticks_are_skipped() {
        let service = Arc::new(SlowFlushService::new(Duration::from_millis(2500)));
        let scheduler = scheduler(service.clone(), 1);

        assert_ok!(run_for(&scheduler, 10).await);

        let stats = scheduler.stats();
        assert!(stats.skipped_ticks >= 2, "stats: {:?}", stats);
        assert!(stats.runs >= 2, "stats: {:?}", stats);
        assert_eq!(stats.runs + stats.skipped_ticks, stats.ticks);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_skipped_while_drain_holds_lock() {
        let service = Arc::new(SlowFlushService::new(Duration::from_millis(10)));
        let scheduler = scheduler(service.clone(), 1);

        let guard = service.flush_lock.lock().await;
        let handle = tokio::spawn({
            let scheduler = Arc::clone(&scheduler);
            async move { scheduler.start().await }
        });
        tokio::time::sleep(Duration::from_millis(1500)).await;
        drop(guard);
        scheduler.stop();
        assert_ok!(handle.await.unwrap());

        let stats = scheduler.stats();
        assert_eq!(stats.ticks, 1);
        assert_eq!(stats.skipped_ticks, 1);
        assert_eq!(stats.runs, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_flush_is_counted_and_loop_continues() {
        let service = Arc::new(SlowFlushService::new(Duration::from_millis(10)));
        service.fail_flushes();
        let scheduler = scheduler(service.clone(), 1);

        assert_ok!(run_for(&scheduler, 3).await);

        let stats = scheduler.stats();
        assert_eq!(stats.failures, stats.ticks);
        assert!(stats.failures >= 2);
        assert!(stats.last_report.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_start_is_rejected() {
        let service = Arc::new(SlowFlushService::new(Duration::from_millis(10)));
        let scheduler = scheduler(service, 60);

        let handle = tokio::spawn({
            let scheduler = Arc::clone(&scheduler);
            async move { scheduler.start().await }
        });
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(scheduler.is_running());

        let err = assert_err!(scheduler.start().await);
        assert!(matches!(err, JobError::Scheduler(_)));

        scheduler.stop();
        scheduler.stop();
        assert_ok!(handle.await.unwrap());
        assert!(!scheduler.is_running());
    }

    #[test]
    fn test_scheduler_id_format() {
        let service = Arc::new(SlowFlushService::new(Duration::ZERO));
        let scheduler = scheduler(service, 1);
        assert!(scheduler.id().starts_with("like-sync-"));
        assert_eq!(scheduler.stats().id, scheduler.id());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_before_loop_runs_ends_loop() {
        let service = Arc::new(SlowFlushService::new(Duration::from_millis(10)));
        let scheduler = scheduler(service.clone(), 1);

        let handle = tokio::spawn({
            let scheduler = Arc::clone(&scheduler);
            async move { scheduler.start().await }
        });
        scheduler.stop();

        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("scheduler loop ignored the early stop");
        assert_ok!(result.unwrap());

        assert!(!scheduler.is_running());
        assert_eq!(scheduler.stats().ticks, 0);
        assert_eq!(service.flushes.load(Ordering::SeqCst), 0);

        // A stopped scheduler does not come back.
        assert_ok!(tokio::time::timeout(Duration::from_secs(5), scheduler.start()).await.unwrap());
        assert_eq!(scheduler.stats().ticks, 0);
    }
}
