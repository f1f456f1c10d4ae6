use chrono::{DateTime, Duration, Utc};

/// Minimum time between two network attempts.
/// The schedule changes a few times a day at most, so an hour keeps it fresh
/// without hammering the server on every app launch.
pub const DEFAULT_MIN_FETCH_INTERVAL_MINUTES: i64 = 60;

/// Whether a network attempt is warranted.
///
/// True if `forced`, if we never tried before, or if at least `min_interval`
/// has elapsed since the last attempt.
pub fn should_attempt_fetch(
    now: DateTime<Utc>,
    last_attempt: Option<DateTime<Utc>>,
    min_interval: Duration,
    forced: bool,
) -> bool {
    if forced {
        return true;
    }
    match last_attempt {
        None => true,
        Some(last) => now - last >= min_interval,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessPolicy {
    min_interval: Duration,
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self::new(Duration::minutes(DEFAULT_MIN_FETCH_INTERVAL_MINUTES))
    }
}

impl FreshnessPolicy {
    pub fn new(min_interval: Duration) -> Self {
        Self { min_interval }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    pub fn should_attempt_fetch(
        &self,
        now: DateTime<Utc>,
        last_attempt: Option<DateTime<Utc>>,
        forced: bool,
    ) -> bool {
        should_attempt_fetch(now, last_attempt, self.min_interval, forced)
    }

    /// True when the server reports the same marker as the one we hold.
    pub fn is_unchanged(
        &self,
        server_marker: Option<DateTime<Utc>>,
        stored_marker: Option<DateTime<Utc>>,
    ) -> bool {
        matches!((server_marker, stored_marker), (Some(server), Some(stored)) if server == stored)
    }
}
