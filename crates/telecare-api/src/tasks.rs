//! Background maintenance tasks.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Days, NaiveTime, TimeZone, Utc};

use telecare_devices::camera::PresetService;

/// Time until the next UTC midnight.
#[must_use]
pub fn until_next_midnight(now: DateTime<Utc>) -> Duration {
    let next_day = now
        .date_naive()
        .checked_add_days(Days::new(1))
        .unwrap_or(now.date_naive());
    let next_midnight = Utc.from_utc_datetime(&next_day.and_time(NaiveTime::MIN));
    (next_midnight - now)
        .to_std()
        .unwrap_or(Duration::from_secs(60))
}

/// Run the orphaned-preset cleanup daily at 00:00.
///
/// The task loops forever; callers keep the join handle for shutdown.
pub fn spawn_preset_cleanup(presets: Arc<PresetService>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let wait = until_next_midnight(Utc::now());
            tracing::debug!(
                seconds = wait.as_secs(),
                "Preset cleanup scheduled for next midnight"
            );
            tokio::time::sleep(wait).await;

            if let Err(err) = presets.cleanup_orphaned() {
                tracing::error!(error = %err, "Orphaned-preset cleanup failed");
            }
        }
    })
}
