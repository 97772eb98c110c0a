//! Like engine lifecycle.

use crate::di::{build_like_engine_module, create_cache_backend, LikeEngineModule, LikeEngineResolver};
use crate::startup::print_startup_info;
use agora_config::{AppConfig, LikesConfig};
use agora_core::{AgoraError, AgoraResult};
use agora_jobs::{JobResult, LikeSyncScheduler, ShutdownDrain, SyncSchedule};
use agora_repository::{DatabasePool, DatabasePoolInterface};
use agora_service::{FlushReport, LikeService};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// A running like engine: the module, its sync scheduler and its drain.
pub struct LikeEngine {
    module: Arc<LikeEngineModule>,
    scheduler: Arc<LikeSyncScheduler>,
    scheduler_task: JoinHandle<JobResult<()>>,
    drain: Option<ShutdownDrain>,
}

impl LikeEngine {
    /// Connects the stores, builds the module and starts the sync scheduler.
    pub async fn start(config: &AppConfig) -> AgoraResult<Self> {
        let schedule = SyncSchedule::from_config(&config.likes)?;

        let db_pool = DatabasePool::connect(&config.database).await?;
        if config.database.run_migrations {
            db_pool.run_migrations().await?;
        }

        let cache = create_cache_backend(&config.redis).await?;
        print_startup_info(config, &schedule, cache.name());

        if config.observability.metrics_enabled {
            agora_jobs::register_metrics();
        }

        let module = build_like_engine_module(&db_pool, cache);
        Ok(Self::with_module(module, schedule, &config.likes))
    }

    /// Starts the scheduler for an already built module.
    pub fn with_module(module: Arc<LikeEngineModule>, schedule: SyncSchedule, likes: &LikesConfig) -> Self {
        let service = module.like_service();
        let scheduler = Arc::new(LikeSyncScheduler::new(Arc::clone(&service), schedule));

        let scheduler_task = tokio::spawn({
            let scheduler = Arc::clone(&scheduler);
            async move { scheduler.start().await }
        });

        let drain = likes.drain_on_shutdown.then(|| ShutdownDrain::new(service));

        Self {
            module,
            scheduler,
            scheduler_task,
            drain,
        }
    }

    /// The like service for request handlers.
    pub fn like_service(&self) -> Arc<dyn LikeService> {
        self.module.like_service()
    }

    /// The sync scheduler.
    pub fn scheduler(&self) -> &LikeSyncScheduler {
        &self.scheduler
    }

    /// Stops the scheduler, drains the cache once and closes the database pool.
    ///
    /// Returns the drain report, or `None` when draining is disabled.
    pub async fn shutdown(self) -> AgoraResult<Option<FlushReport>> {
        info!("Shutting down like engine...");

        self.scheduler.stop();
        match self.scheduler_task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "Like sync scheduler ended with an error"),
            Err(e) => warn!(error = %e, "Like sync scheduler task panicked"),
        }

        let report = match &self.drain {
            Some(drain) => drain.run().await.map_err(AgoraError::from),
            None => {
                info!("Shutdown drain disabled, unflushed likes stay in the cache");
                Ok(None)
            }
        };

        self.module.database_pool().close().await;
        info!("Like engine shutdown complete");
        report
    }
}

impl std::fmt::Debug for LikeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LikeEngine")
            .field("scheduler", &self.scheduler)
            .field("drain", &self.drain)
            .finish_non_exhaustive()
    }
}
