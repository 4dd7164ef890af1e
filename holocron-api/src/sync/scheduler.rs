//! Daily synchronization schedule

use chrono::{DateTime, Local, NaiveTime, TimeZone};
use holocron_common::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::FilmSynchronizer;

/// Fires once per day at a fixed local wall-clock time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySchedule {
    at: NaiveTime,
}

impl DailySchedule {
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        let at = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
            Error::Config(format!("Invalid sync time {:02}:{:02}", hour, minute))
        })?;
        Ok(Self { at })
    }

    /// First firing strictly after `now`.
    ///
    /// A day whose wall-clock time does not exist (DST gap) is skipped.
    pub fn next_run_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let tz = now.timezone();
        let mut date = now.date_naive();

        loop {
            if let Some(candidate) = date.and_time(self.at).and_local_timezone(tz.clone()).earliest() {
                if candidate > *now {
                    return candidate;
                }
            }
            date = match date.succ_opt() {
                Some(next) => next,
                None => return now.clone(),
            };
        }
    }
}

/// Spawn the background task that runs `synchronizer` on `schedule` until
/// `shutdown` is cancelled. Run failures are logged and the schedule continues.
pub fn spawn_daily_sync(
    synchronizer: Arc<FilmSynchronizer>,
    schedule: DailySchedule,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let now = Local::now();
            let next = schedule.next_run_after(&now);
            let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
            info!(next_run = %next, "Next scheduled synchronization");

            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Sync scheduler stopped");
                    break;
                }
                _ = tokio::time::sleep(wait) => {}
            }

            info!("Running scheduled Star Wars movies synchronization");
            match synchronizer.run().await {
                Ok(outcome) => info!(
                    synchronized = outcome.synchronized,
                    attempted = outcome.attempted,
                    "Scheduled synchronization finished"
                ),
                Err(e) => error!(error = %e, "Scheduled synchronization failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_invalid_time_rejected() {
        assert!(DailySchedule::new(24, 0).is_err());
        assert!(DailySchedule::new(3, 60).is_err());
    }

    #[test]
    fn test_next_run_later_today() {
        let schedule = DailySchedule::new(3, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 1, 30, 0).unwrap();

        assert_eq!(
            schedule.next_run_after(&now),
            Utc.with_ymd_and_hms(2024, 3, 10, 3, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_next_run_tomorrow_when_passed() {
        let schedule = DailySchedule::new(3, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 3, 0, 0).unwrap();

        // Exactly at the firing time counts as passed
        assert_eq!(
            schedule.next_run_after(&now),
            Utc.with_ymd_and_hms(2024, 3, 11, 3, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_next_run_respects_offset() {
        let schedule = DailySchedule::new(3, 0).unwrap();
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2024, 12, 31, 22, 0, 0).unwrap();

        let next = schedule.next_run_after(&now);
        assert_eq!(next, tz.with_ymd_and_hms(2025, 1, 1, 3, 0, 0).unwrap());
    }
}
