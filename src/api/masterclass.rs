use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::countdown::{RemainingTime, TimeWindow, WindowPhase};
use crate::events::CountdownId;

/// A masterclass as served by `/api/masterclass`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Masterclass {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub max_participants: Option<u32>,
    pub price: Option<Decimal>,
    /// Length of each session, in hours
    pub duration: Option<Decimal>,
}

/// What the registration area should offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallToAction {
    /// Not purchased yet: go to checkout.
    Register,
    /// Purchased, waiting for the start date.
    AwaitStart,
    /// Purchased and started (or over): open the resources.
    JoinNow,
}

impl Masterclass {
    pub fn countdown_id(&self) -> CountdownId {
        CountdownId::Masterclass(self.id)
    }

    /// Window counted down on the registration card: it closes when the masterclass starts.
    pub fn registration_window(&self) -> Option<TimeWindow> {
        TimeWindow::from_raw(None, self.start_date.as_deref())
    }

    /// Full start → end window.
    pub fn window(&self) -> Option<TimeWindow> {
        TimeWindow::from_raw(self.start_date.as_deref(), self.end_date.as_deref())
    }

    pub fn phase(&self, now: DateTime<Utc>) -> Option<WindowPhase> {
        self.window().map(|w| w.phase(now))
    }

    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        self.registration_window().is_some_and(|w| w.is_expired(now))
    }

    /// A purchaser without a readable start date is let in.
    pub fn call_to_action(&self, has_purchased: bool, now: DateTime<Utc>) -> CallToAction {
        if !has_purchased {
            return CallToAction::Register;
        }
        match self.registration_window() {
            Some(w) if !w.is_expired(now) => CallToAction::AwaitStart,
            _ => CallToAction::JoinNow,
        }
    }

    /// Start time as `HH:MM` in the given offset.
    pub fn start_hour(&self, offset: FixedOffset) -> Option<String> {
        let start = self.registration_window()?.end();
        Some(start.with_timezone(&offset).format("%H:%M").to_string())
    }

    /// Total length from start to end.
    pub fn total_duration(&self) -> Option<RemainingTime> {
        self.window()?.span()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    const JSON: &str = r#"{
        "id": 7,
        "title": "Improvisation jazz",
        "slug": "improvisation-jazz",
        "startDate": "2025-03-01T18:00:00.000Z",
        "endDate": "2025-03-15T20:00:00.000Z",
        "maxParticipants": 12,
        "price": 149.9,
        "duration": 2,
        "imageUrl": "/uploads/jazz.png"
    }"#;

    fn masterclass() -> Masterclass {
        serde_json::from_str(JSON).unwrap()
    }

    fn at(day: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, h, 0, 0).unwrap()
    }

    #[test]
    fn test_decode() {
        let mc = masterclass();
        assert_eq!(mc.id, 7);
        assert_eq!(mc.slug, "improvisation-jazz");
        assert_eq!(mc.max_participants, Some(12));
        assert_eq!(mc.price, Some(dec!(149.9)));
        assert_eq!(mc.countdown_id(), CountdownId::Masterclass(7));
    }

    #[test]
    fn test_registration_counts_down_to_start() {
        let mc = masterclass();
        let window = mc.registration_window().unwrap();
        assert_eq!(window.end(), at(1, 18));
        assert_eq!(window.remaining(at(1, 16)).to_string(), "2h 0m 0s");
    }

    #[test]
    fn test_phase() {
        let mc = masterclass();
        assert_eq!(mc.phase(at(1, 10)), Some(WindowPhase::Upcoming));
        assert_eq!(mc.phase(at(5, 10)), Some(WindowPhase::Live));
        assert_eq!(mc.phase(at(20, 10)), Some(WindowPhase::Ended));
        assert!(!mc.has_started(at(1, 10)));
        assert!(mc.has_started(at(1, 18)));
    }

    #[test]
    fn test_call_to_action() {
        let mc = masterclass();
        assert_eq!(mc.call_to_action(false, at(1, 10)), CallToAction::Register);
        assert_eq!(mc.call_to_action(false, at(5, 10)), CallToAction::Register);
        assert_eq!(mc.call_to_action(true, at(1, 10)), CallToAction::AwaitStart);
        assert_eq!(mc.call_to_action(true, at(1, 18)), CallToAction::JoinNow);

        let undated = Masterclass {
            start_date: None,
            ..masterclass()
        };
        assert_eq!(undated.call_to_action(true, at(1, 10)), CallToAction::JoinNow);
    }

    #[test]
    fn test_start_hour() {
        let mc = masterclass();
        assert_eq!(mc.start_hour(FixedOffset::east_opt(0).unwrap()).as_deref(), Some("18:00"));
        assert_eq!(mc.start_hour(FixedOffset::east_opt(3600).unwrap()).as_deref(), Some("19:00"));

        let undated = Masterclass {
            start_date: None,
            ..masterclass()
        };
        assert_eq!(undated.start_hour(FixedOffset::east_opt(0).unwrap()), None);
    }

    #[test]
    fn test_total_duration() {
        let mc = masterclass();
        assert_eq!(mc.total_duration().unwrap().to_string(), "14j 2h 0m 0s");

        let open_ended = Masterclass {
            end_date: None,
            ..masterclass()
        };
        assert_eq!(open_ended.total_duration(), None);
    }
}
