//! Agora Jobs - background work of the like engine.
//!
//! ```text
//!   SyncSchedule (interval | cron)
//!          │ tick
//!          ▼
//!   LikeSyncScheduler ──try_flush_all──▶ LikeService ──▶ cache ─▶ database
//!          │ stop()                          ▲
//!          ▼                                 │ flush_all (waits for a running pass)
//!   ShutdownDrain ───────────────────────────┘
//! ```
//!
//! A tick that finds a flush still running is skipped, never queued.

pub mod drain;
pub mod error;
pub mod metrics;
pub mod schedule;
pub mod scheduler;

pub use drain::ShutdownDrain;
pub use error::{JobError, JobResult};
pub use metrics::{register_metrics, SyncMetrics};
pub use schedule::{cron_expressions, SyncSchedule};
pub use scheduler::{LikeSyncScheduler, SyncStats};
