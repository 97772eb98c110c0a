//! When the like sync fires.

use crate::error::{JobError, JobResult};
use agora_config::LikesConfig;
use chrono::{DateTime, Utc};
use cron::Schedule;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Flush cadence: a fixed period or a cron schedule.
#[derive(Debug, Clone)]
pub enum SyncSchedule {
    /// Fire every period, first one period after start.
    Interval(Duration),
    /// Fire at each upcoming cron instant (UTC).
    Cron(Box<Schedule>),
}

impl SyncSchedule {
    /// Fixed-period schedule.
    pub fn every(period: Duration) -> JobResult<Self> {
        if period.is_zero() {
            return Err(JobError::Configuration(
                "Sync interval must be positive".to_string(),
            ));
        }
        Ok(Self::Interval(period))
    }

    /// Cron schedule in the six-field `sec min hour day month weekday` syntax.
    pub fn cron(expression: &str) -> JobResult<Self> {
        Schedule::from_str(expression)
            .map(|schedule| Self::Cron(Box::new(schedule)))
            .map_err(|e| JobError::Configuration(format!("Invalid cron expression: {}", e)))
    }

    /// Builds the schedule from configuration. A cron expression wins over the interval.
    pub fn from_config(config: &LikesConfig) -> JobResult<Self> {
        match &config.sync_cron {
            Some(expression) => Self::cron(expression),
            None => Self::every(config.sync_interval()),
        }
    }

    /// Time from `now` until the next firing, or `None` if the schedule is exhausted.
    pub fn delay_after(&self, now: DateTime<Utc>) -> Option<Duration> {
        match self {
            Self::Interval(period) => Some(*period),
            Self::Cron(schedule) => schedule
                .after(&now)
                .next()
                .map(|next| (next - now).to_std().unwrap_or(Duration::ZERO)),
        }
    }

    pub(crate) fn ticker(&self) -> Ticker {
        match self {
            Self::Interval(period) => {
                let mut interval = interval_at(Instant::now() + *period, *period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                Ticker::Interval(interval)
            }
            Self::Cron(_) => Ticker::Cron(self.clone()),
        }
    }
}

impl fmt::Display for SyncSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interval(period) => write!(f, "every {}s", period.as_secs()),
            Self::Cron(schedule) => write!(f, "cron '{}'", schedule),
        }
    }
}

/// Tick source driven by a [`SyncSchedule`].
pub(crate) enum Ticker {
    Interval(Interval),
    Cron(SyncSchedule),
}

impl Ticker {
    /// Completes at the next firing. Never completes once a cron schedule is exhausted.
    pub(crate) async fn tick(&mut self) {
        match self {
            Self::Interval(interval) => {
                interval.tick().await;
            }
            Self::Cron(schedule) => match schedule.delay_after(Utc::now()) {
                Some(delay) => tokio::time::sleep(delay).await,
                None => std::future::pending::<()>().await,
            },
        }
    }
}

/// Common cron expressions.
pub mod cron_expressions {
    /// Every minute.
    pub const EVERY_MINUTE: &str = "0 * * * * *";

    /// Every 5 minutes.
    pub const EVERY_5_MINUTES: &str = "0 */5 * * * *";

    /// Every 15 minutes.
    pub const EVERY_15_MINUTES: &str = "0 */15 * * * *";

    /// Every hour.
    pub const EVERY_HOUR: &str = "0 0 * * * *";

    /// Every day at 3 AM, a common quiet hour.
    pub const NIGHTLY: &str = "0 0 3 * * *";
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_cron_takes_precedence() {
        let config = LikesConfig {
            sync_interval_secs: 60,
            sync_cron: Some(cron_expressions::EVERY_5_MINUTES.to_string()),
            drain_on_shutdown: true,
        };
        assert!(matches!(
            SyncSchedule::from_config(&config).unwrap(),
            SyncSchedule::Cron(_)
        ));
    }

    #[test]
    fn test_interval_from_config() {
        let schedule = SyncSchedule::from_config(&LikesConfig::default()).unwrap();
        assert_eq!(
            schedule.delay_after(Utc::now()),
            Some(Duration::from_secs(300))
        );
        assert_eq!(schedule.to_string(), "every 300s");
    }

    #[test]
    fn test_zero_interval_rejected() {
        let err = SyncSchedule::every(Duration::ZERO).unwrap_err();
        assert!(matches!(err, JobError::Configuration(_)));
    }

    #[test]
    fn test_invalid_cron_rejected() {
        assert!(SyncSchedule::cron("every now and then").is_err());
    }

    #[test]
    fn test_cron_delay_until_next_slot() {
        let schedule = SyncSchedule::cron(cron_expressions::EVERY_5_MINUTES).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 3, 30).unwrap();
        assert_eq!(schedule.delay_after(now), Some(Duration::from_secs(90)));
    }
}
