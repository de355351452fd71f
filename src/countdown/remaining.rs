use chrono::{DateTime, Utc};
use std::fmt;

const MS_PER_DAY: i64 = 86_400_000;
const MS_PER_HOUR: i64 = 3_600_000;
const MS_PER_MINUTE: i64 = 60_000;
const MS_PER_SECOND: i64 = 1000;

/// Label shown once a countdown has run out.
pub const EXPIRED_LABEL: &str = "Expiré";

/// Days/hours/minutes/seconds left until a window's end.
/// All fields are zero when expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RemainingTime {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub is_expired: bool,
}

impl RemainingTime {
    /// The terminal state.
    pub fn expired() -> Self {
        Self {
            is_expired: true,
            ..Default::default()
        }
    }

    /// Break a millisecond delta into whole units.
    /// `delta_ms <= 0` is expired. Sub-second leftovers are dropped.
    pub fn from_millis(delta_ms: i64) -> Self {
        if delta_ms <= 0 {
            return Self::expired();
        }

        let days = delta_ms / MS_PER_DAY;
        let hours = (delta_ms % MS_PER_DAY) / MS_PER_HOUR;
        let minutes = (delta_ms % MS_PER_HOUR) / MS_PER_MINUTE;
        let seconds = (delta_ms % MS_PER_MINUTE) / MS_PER_SECOND;

        Self {
            days: days as u64,
            hours: hours as u64,
            minutes: minutes as u64,
            seconds: seconds as u64,
            is_expired: false,
        }
    }

    /// Time left from `now` until `end`.
    pub fn until(end: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self::from_millis((end - now).num_milliseconds())
    }

    /// Whole seconds represented by the breakdown.
    pub fn total_seconds(&self) -> u64 {
        self.days * 86_400 + self.hours * 3600 + self.minutes * 60 + self.seconds
    }
}

impl fmt::Display for RemainingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_expired {
            return f.write_str(EXPIRED_LABEL);
        }
        // No "0j" prefix under a day
        if self.days > 0 {
            write!(
                f,
                "{}j {}h {}m {}s",
                self.days, self.hours, self.minutes, self.seconds
            )
        } else {
            write!(f, "{}h {}m {}s", self.hours, self.minutes, self.seconds)
        }
    }
}
