//! Decides whether cached dashboard state is stale enough to refetch.

use std::time::Duration;

use time::OffsetDateTime;

/// Default freshness window: five minutes.
pub const DEFAULT_TTL: Duration = Duration::from_millis(300_000);

/// Pure refresh policy keyed on the age of the last successful fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessGate {
    ttl: Duration,
}

impl Default for FreshnessGate {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl FreshnessGate {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return whether a full aggregate fetch should run now.
    ///
    /// `force` always fetches. Otherwise a fetch happens when nothing has been
    /// loaded yet, when the overview is missing, while a load is already in
    /// flight, or once `last_updated` is at least one TTL old. A clock that
    /// went backwards counts as fresh.
    pub fn should_fetch(
        &self,
        now: OffsetDateTime,
        last_updated: Option<OffsetDateTime>,
        has_overview: bool,
        is_loading: bool,
        force: bool,
    ) -> bool {
        if force {
            return true;
        }
        let Some(last_updated) = last_updated else {
            return true;
        };
        if !has_overview || is_loading {
            return true;
        }
        let age = now - last_updated;
        !age.is_negative() && age.unsigned_abs() >= self.ttl
    }
}
