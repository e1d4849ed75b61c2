//! Wall-clock aligned pacing for the ingestion loops.

use chrono::{DateTime, Duration, Local, NaiveTime, TimeZone};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Boundary period, counted from local midnight
///
/// `Cadence::minutes(5)` lands on XX:00, XX:05, ...; `Cadence::hours(4)` on
/// 00:00, 04:00, ... 20:00.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    seconds: i64,
}

impl Cadence {
    pub const fn minutes(n: u32) -> Self {
        Self {
            seconds: n as i64 * 60,
        }
    }

    pub const fn hours(n: u32) -> Self {
        Self {
            seconds: n as i64 * 3600,
        }
    }

    pub fn period(&self) -> Duration {
        Duration::seconds(self.seconds)
    }
}

/// First boundary strictly after `now`
///
/// An exact boundary is not "in the future": 10:10:00 with a 5-minute cadence
/// yields 10:15:00.
pub fn next_boundary<Tz: TimeZone>(now: &DateTime<Tz>, cadence: Cadence) -> DateTime<Tz> {
    let period = cadence.seconds.clamp(1, SECONDS_PER_DAY);

    let local = now.naive_local();
    let midnight = local.date().and_time(NaiveTime::MIN);
    let elapsed = (local - midnight).num_seconds();

    let next_offset = (elapsed / period + 1) * period;
    let next_local = midnight + Duration::seconds(next_offset);

    // DST gaps can make the local time unrepresentable; fall back to the
    // same offset from `now`
    match now.timezone().from_local_datetime(&next_local).earliest() {
        Some(next) if next > *now => next,
        _ => now.clone() + (next_local - local),
    }
}

/// Decides whether and how long each loop waits before a cycle
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    delay_enabled: bool,
    skip_first_delay: bool,
}

impl Scheduler {
    pub fn new(delay_enabled: bool, skip_first_delay: bool) -> Self {
        Self {
            delay_enabled,
            skip_first_delay,
        }
    }

    /// False disables all waiting (dev/test runs)
    pub fn should_delay(&self) -> bool {
        self.delay_enabled
    }

    /// Wait as needed before cycle number `cycle` (0-based)
    pub async fn pace(&self, cadence: Cadence, cycle: u64) {
        if !self.should_delay() {
            return;
        }
        if cycle == 0 && self.skip_first_delay {
            tracing::info!("Skipping delay for first cycle");
            return;
        }
        self.wait_for_next_boundary(cadence).await;
    }

    /// Sleep until the next boundary of `cadence`
    pub async fn wait_for_next_boundary(&self, cadence: Cadence) {
        let now = Local::now();
        let next = next_boundary(&now, cadence);
        let delay = (next.clone() - now).to_std().unwrap_or_default();

        tracing::info!(
            next_time = %next.format("%H:%M:%S"),
            delay_seconds = delay.as_secs(),
            "Waiting for next execution time"
        );

        tokio::time::sleep(delay).await;
    }
}
