//! Server startup utilities.

use agora_config::AppConfig;
use agora_jobs::SyncSchedule;
use tracing::info;

/// Logs what this instance is about to run.
pub fn print_startup_info(config: &AppConfig, schedule: &SyncSchedule, cache_backend: &str) {
    let separator = "=".repeat(60);
    info!("{}", separator);
    info!("{} v{} ({})", config.app.name, config.app.version, config.app.environment);
    info!("Like cache:     {}", cache_backend);
    info!("Like sync:      {}", schedule);
    info!(
        "Shutdown drain: {}",
        if config.likes.drain_on_shutdown { "enabled" } else { "disabled" }
    );
    info!("{}", separator);
}
