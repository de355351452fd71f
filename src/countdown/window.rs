use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::warn;

use super::RemainingTime;
use crate::error::WindowError;

/// Where `now` falls relative to a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPhase {
    /// Before `start`.
    Upcoming,
    /// Between `start` (or the beginning of time) and `end`.
    Live,
    /// At or after `end`.
    Ended,
}

/// A promotional or event period. `end` drives the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: Option<DateTime<Utc>>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: Option<DateTime<Utc>>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Window with no start, e.g. a discount that is valid until `end`.
    pub fn ending_at(end: DateTime<Utc>) -> Self {
        Self { start: None, end }
    }

    /// Build a window from upstream ISO-8601 strings.
    ///
    /// Accepts RFC 3339, naive date-times (read as UTC) and bare dates
    /// (midnight UTC). Blank strings count as absent.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, WindowError> {
        let end = match end.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => parse_timestamp("end", raw)?,
            None => return Err(WindowError::MissingEnd),
        };
        let start = match start.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(parse_timestamp("start", raw)?),
            None => None,
        };
        Ok(Self { start, end })
    }

    /// Like `parse`, but logs and returns `None` on bad input.
    pub fn from_raw(start: Option<&str>, end: Option<&str>) -> Option<Self> {
        Self::parse(start, end)
            .map_err(|e| warn!("Ignoring time window: {e}"))
            .ok()
    }

    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.end <= now
    }

    pub fn remaining(&self, now: DateTime<Utc>) -> RemainingTime {
        RemainingTime::until(self.end, now)
    }

    pub fn phase(&self, now: DateTime<Utc>) -> WindowPhase {
        if self.is_expired(now) {
            WindowPhase::Ended
        } else if self.start.is_some_and(|start| now < start) {
            WindowPhase::Upcoming
        } else {
            WindowPhase::Live
        }
    }

    /// Total length from start to end, in countdown units.
    /// `None` without a start or when the window is empty.
    pub fn span(&self) -> Option<RemainingTime> {
        let start = self.start?;
        let span = RemainingTime::until(self.end, start);
        (!span.is_expired).then_some(span)
    }
}

fn parse_timestamp(field: &'static str, raw: &str) -> Result<DateTime<Utc>, WindowError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    if let Some(midnight) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc());
    }
    Err(WindowError::InvalidTimestamp {
        field,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, h, m, 0).unwrap()
    }

    #[test]
    fn test_parse_rfc3339() {
        let window = TimeWindow::parse(None, Some("2025-03-01T18:00:00.000Z")).unwrap();
        assert_eq!(window.end(), at(18, 0));
        assert_eq!(window.start(), None);

        // Offsets are normalized to UTC
        let window = TimeWindow::parse(None, Some("2025-03-01T19:30:00+01:00")).unwrap();
        assert_eq!(window.end(), at(18, 30));
    }

    #[test]
    fn test_parse_naive_and_date_only() {
        let window = TimeWindow::parse(Some("2025-03-01"), Some("2025-03-01T18:00:00")).unwrap();
        assert_eq!(window.start(), Some(at(0, 0)));
        assert_eq!(window.end(), at(18, 0));
    }

    #[test]
    fn test_parse_missing_end() {
        assert!(matches!(
            TimeWindow::parse(Some("2025-03-01"), None),
            Err(WindowError::MissingEnd)
        ));
        assert!(matches!(
            TimeWindow::parse(None, Some("   ")),
            Err(WindowError::MissingEnd)
        ));
    }

    #[test]
    fn test_parse_invalid() {
        match TimeWindow::parse(None, Some("next tuesday")) {
            Err(WindowError::InvalidTimestamp { field, value }) => {
                assert_eq!(field, "end");
                assert_eq!(value, "next tuesday");
            }
            other => panic!("Expected InvalidTimestamp, got {other:?}"),
        }
        assert!(TimeWindow::parse(Some("bogus"), Some("2025-03-01")).is_err());
        assert_eq!(TimeWindow::from_raw(None, Some("bogus")), None);
    }

    #[test]
    fn test_phase() {
        let window = TimeWindow::new(Some(at(10, 0)), at(12, 0));
        assert_eq!(window.phase(at(9, 0)), WindowPhase::Upcoming);
        assert_eq!(window.phase(at(10, 0)), WindowPhase::Live);
        assert_eq!(window.phase(at(11, 59)), WindowPhase::Live);
        assert_eq!(window.phase(at(12, 0)), WindowPhase::Ended);

        // No start: live until the end
        let open = TimeWindow::ending_at(at(12, 0));
        assert_eq!(open.phase(at(0, 0)), WindowPhase::Live);
    }

    #[test]
    fn test_span() {
        let window = TimeWindow::new(Some(at(10, 0)), at(10, 0) + Duration::days(3) + Duration::hours(2));
        assert_eq!(window.span().unwrap().to_string(), "3j 2h 0m 0s");

        assert_eq!(TimeWindow::ending_at(at(10, 0)).span(), None);
        assert_eq!(TimeWindow::new(Some(at(12, 0)), at(10, 0)).span(), None);
    }

    #[test]
    fn test_expiry() {
        let window = TimeWindow::ending_at(at(12, 0));
        assert!(!window.is_expired(at(11, 0)));
        assert!(window.is_expired(at(12, 0)));
        assert_eq!(window.remaining(at(11, 0)).to_string(), "1h 0m 0s");
    }
}
