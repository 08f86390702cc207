// Cron timer trigger and timer loop

use crate::errors::ScheduleError;
use crate::pipeline::PostProcessor;
use chrono::{DateTime, Utc};
use cron::Schedule as CronSchedule;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::sleep;
use tracing::{info, warn};

/// Recurring trigger driven by a cron expression with second precision.
pub struct TimerTrigger {
    schedule: CronSchedule,
}

impl TimerTrigger {
    /// Parse and validate the cron expression
    pub fn new(expression: &str) -> Result<Self, ScheduleError> {
        let schedule = CronSchedule::from_str(expression).map_err(|e| {
            ScheduleError::InvalidCronExpression {
                expression: expression.to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self { schedule })
    }

    /// Next fire time strictly after `after`, in UTC.
    pub fn next_fire(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.after(&after).next()
    }
}

/// Drive the processor from the trigger until a shutdown signal arrives.
///
/// Ticks run sequentially; a tick that outlasts its slot delays the next one
/// rather than overlapping it.
pub async fn run_timer(
    trigger: &TimerTrigger,
    processor: &PostProcessor,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        let now = Utc::now();
        let Some(fire_at) = trigger.next_fire(now) else {
            warn!("Schedule has no upcoming fire time, stopping timer loop");
            break;
        };

        let wait = (fire_at - now)
            .to_std()
            .unwrap_or_else(|_| Duration::from_secs(0));

        tokio::select! {
            _ = sleep(wait) => {
                let next = trigger.next_fire(Utc::now());
                processor.run_tick(next).await;
            }
            _ = shutdown.recv() => {
                info!("Shutdown signal received, stopping timer loop");
                break;
            }
        }
    }
}
