//! Daily trigger loop driving the engine once per UTC day.

use std::{sync::Arc, thread, time::Duration};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::engine::RecurrenceEngine;
use crate::time::Clock;

/// Runs the engine for a fixed set of owners on a daily cadence.
///
/// The loop is crash-proof by construction: every failure inside a tick is
/// logged and swallowed so the next scheduled tick still runs.
pub struct Scheduler {
    engine: Arc<RecurrenceEngine>,
    clock: Arc<dyn Clock>,
    owners: Vec<Uuid>,
}

impl Scheduler {
    pub fn new(engine: Arc<RecurrenceEngine>, clock: Arc<dyn Clock>, owners: Vec<Uuid>) -> Self {
        Self {
            engine,
            clock,
            owners,
        }
    }

    /// Processes every registered owner once, as of the clock's current UTC
    /// day. Returns the total number of entries created.
    pub fn tick_once(&self) -> usize {
        let today = self.clock.today();
        let mut created = 0;
        for owner in &self.owners {
            match self.engine.run_due(*owner, today) {
                Ok(summary) => {
                    created += summary.created;
                    for failure in &summary.failures {
                        tracing::warn!(
                            owner = %owner,
                            template = %failure.template_id,
                            reason = %failure.reason,
                            "template failed during scheduled tick"
                        );
                    }
                }
                Err(err) => {
                    tracing::error!(owner = %owner, error = %err, "scheduled run failed");
                }
            }
        }
        created
    }

    /// Blocks forever, ticking once at each UTC midnight.
    pub fn run_forever(&self) -> ! {
        loop {
            let wait = duration_until_next_utc_midnight(self.clock.now());
            tracing::info!(seconds = wait.as_secs(), "sleeping until next UTC midnight");
            thread::sleep(wait);
            self.tick_once();
        }
    }
}

fn duration_until_next_utc_midnight(now: DateTime<Utc>) -> Duration {
    let next_midnight = (now.date_naive() + chrono::Duration::days(1))
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always a valid time")
        .and_utc();
    (next_midnight - now).to_std().unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn waits_until_the_following_midnight() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 23, 59, 30).unwrap();
        assert_eq!(duration_until_next_utc_midnight(now), Duration::from_secs(30));

        let midday = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(
            duration_until_next_utc_midnight(midday),
            Duration::from_secs(12 * 3600)
        );
    }
}
