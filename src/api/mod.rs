mod client;
mod discount;
mod masterclass;

pub use client::ApiClient;
pub use discount::Discount;
pub use masterclass::{CallToAction, Masterclass};
