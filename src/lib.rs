//! Live countdowns for storefront promotions and masterclass registrations.
//!
//! The core is [`countdown::CountdownEngine`]: given a [`countdown::TimeWindow`]
//! it publishes the time left, refreshed every second, until the window ends.
//! The rest of the crate feeds it: upstream records and an API client
//! ([`api`]), the sitewide discount banner ([`banner`]), configuration and
//! logging setup for the binaries.

pub mod api;
pub mod banner;
pub mod config;
pub mod countdown;
pub mod error;
pub mod events;
pub mod logging;
