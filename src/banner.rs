use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::debug;

use crate::api::Discount;
use crate::countdown::{CountdownState, TimeWindow};

/// Sitewide promotional banner, driven by the global discount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Hidden,
    Active {
        discount_id: i64,
        percentage: Decimal,
        window: TimeWindow,
    },
}

impl Banner {
    /// Pick the first global discount that is still running at `now`.
    ///
    /// No discounts, no global one, or a global one that is expired or has no
    /// readable expiration date all hide the banner.
    pub fn select(discounts: &[Discount], now: DateTime<Utc>) -> Self {
        let Some(global) = discounts.iter().find(|d| d.is_global) else {
            debug!(count = discounts.len(), "No global discount");
            return Banner::Hidden;
        };

        match global.window() {
            Some(window) if !window.is_expired(now) => Banner::Active {
                discount_id: global.id,
                percentage: global.percentage(),
                window,
            },
            _ => {
                debug!(id = global.id, "Global discount expired or undated");
                Banner::Hidden
            }
        }
    }

    pub fn window(&self) -> Option<TimeWindow> {
        match self {
            Banner::Active { window, .. } => Some(*window),
            Banner::Hidden => None,
        }
    }

    /// Shown while active and its countdown hasn't run out.
    pub fn is_visible(&self, countdown: &CountdownState) -> bool {
        matches!(self, Banner::Active { .. }) && !countdown.is_expired()
    }

    pub fn message(&self, time_left: &str) -> Option<String> {
        match self {
            Banner::Active { percentage, .. } => Some(format!(
                "Bénéficiez de {}% de réductions sur les cours de votre choix. ⏳ Offre expire dans : {}",
                percentage.normalize(),
                time_left
            )),
            Banner::Hidden => None,
        }
    }
}
