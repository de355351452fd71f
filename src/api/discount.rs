use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;

use crate::countdown::TimeWindow;

/// A discount ("remise") as served by `/api/remise`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub id: i64,
    /// Percentage off, e.g. 20 for 20%. Missing counts as 0.
    #[serde(default)]
    pub discount_percentage: Option<Decimal>,
    /// Global discounts apply sitewide and drive the banner
    #[serde(default)]
    pub is_global: bool,
    pub expiration_date: Option<String>,
}

impl Discount {
    /// Validity window, ending at the expiration date.
    /// `None` if the date is missing or unparseable.
    pub fn window(&self) -> Option<TimeWindow> {
        TimeWindow::from_raw(None, self.expiration_date.as_deref())
    }

    /// Still valid at `now`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.window().is_some_and(|w| !w.is_expired(now))
    }

    /// Percentage clamped to 0..=100.
    pub fn percentage(&self) -> Decimal {
        self.discount_percentage
            .unwrap_or(Decimal::ZERO)
            .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
    }

    /// Price after the discount, rounded to cents.
    pub fn apply(&self, price: Decimal) -> Decimal {
        let factor = (Decimal::ONE_HUNDRED - self.percentage()) / Decimal::ONE_HUNDRED;
        (price * factor).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}
