//! Daily staleness policy.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::datetime::start_of_day;

/// Decides whether a channel's feed needs refreshing today.
#[derive(Debug, Clone, Copy)]
pub struct StalenessPolicy {
    tz: Tz,
}

impl StalenessPolicy {
    /// Create a policy whose "today" is the calendar day in `tz`.
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// The timezone defining the calendar day.
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// A channel never synced, or last synced before the start of today, is due.
    pub fn is_due(&self, last_synced_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match last_synced_at {
            None => true,
            Some(last) => last < start_of_day(now, &self.tz),
        }
    }
}

impl Default for StalenessPolicy {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}
