use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;
use std::fs;
use std::time::Duration;

/// Env var overriding `api.base_url`.
pub const API_URL_ENV: &str = "PROMO_API_URL";

#[derive(Debug, Deserialize)]
pub struct Config {
    pub api: Api,
    #[serde(default)]
    pub general: General,
    #[serde(default)]
    pub countdown: Countdown,
}

#[derive(Debug, Deserialize)]
pub struct Api {
    pub base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct General {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Countdown {
    /// Recompute cadence in milliseconds
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Offset used to print masterclass start hours
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_tick_ms() -> u64 {
    1000
}

impl Default for General {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            utc_offset_minutes: 0,
        }
    }
}

impl Countdown {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Falls back to UTC when the offset is out of range.
    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        if let Ok(url) = std::env::var(API_URL_ENV) {
            config.api.base_url = url;
        }
        Ok(config)
    }

    pub fn parse(contents: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full() {
        let config = Config::parse(
            r#"
            [api]
            base_url = "https://don-gold.vercel.app"

            [general]
            log_level = "debug"

            [countdown]
            tick_ms = 500
            utc_offset_minutes = 60
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://don-gold.vercel.app");
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.countdown.tick_interval(), Duration::from_millis(500));
        assert_eq!(config.countdown.utc_offset(), FixedOffset::east_opt(3600).unwrap());
    }

    #[test]
    fn test_parse_defaults() {
        let config = Config::parse("[api]\nbase_url = \"http://localhost:3000\"\n").unwrap();

        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.countdown.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.countdown.utc_offset(), FixedOffset::east_opt(0).unwrap());
    }

    #[test]
    fn test_out_of_range_offset_falls_back_to_utc() {
        let countdown = Countdown {
            tick_ms: 1000,
            utc_offset_minutes: 100_000,
        };
        assert_eq!(countdown.utc_offset(), FixedOffset::east_opt(0).unwrap());
    }

    #[test]
    fn test_missing_api_section() {
        assert!(Config::parse("[general]\nlog_level = \"info\"\n").is_err());
    }
}
