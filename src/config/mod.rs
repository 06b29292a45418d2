//! Configuration loading from environment variables.
//!
//! Everything is read once at startup into an immutable `Config` that is
//! handed to components by value; nothing reads the environment after this
//! point. A `.env` file is honored when present (`dotenvy` in `main`).

use crate::application::scheduler::SchedulerConfig;
use crate::application::strategies::FusionPolicy;
use crate::infrastructure::browser::{BrowserConfig, SiteConfig};
use crate::infrastructure::telegram::TelegramConfig;
use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://55club.game/";
const DEFAULT_GAME_URL: &str =
    "https://55club.game/#/saasLottery/WinGo?gameCode=WinGo_30S&lottery=WinGo";
const DEFAULT_DATABASE_URL: &str = "sqlite://data/wingo.db";

/// Aggregated application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub site: SiteConfig,
    pub browser: BrowserConfig,
    pub telegram: TelegramConfig,
    pub scheduler: SchedulerConfig,
    pub fusion_policy: FusionPolicy,
    pub database_url: String,
}

/// Variable resolution is injected so default handling stays testable
/// without touching process-global state.
type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::load(&|key| env::var(key).ok())
    }

    fn load(lookup: Lookup<'_>) -> Result<Self> {
        let variant = parse_lookup(lookup, "GAME_VARIANT", "1M")?;

        let site = SiteConfig {
            base_url: lookup_or(lookup, "SITE_BASE_URL", DEFAULT_BASE_URL),
            game_url: lookup_or(lookup, "GAME_URL", DEFAULT_GAME_URL),
            username: lookup_or(lookup, "CLUB55_USERNAME", ""),
            password: lookup_or(lookup, "CLUB55_PASSWORD", ""),
            variant,
        };

        let browser = BrowserConfig {
            webdriver_url: lookup_or(lookup, "WEBDRIVER_URL", "http://localhost:9515"),
            headless: parse_lookup(lookup, "HEADLESS", "true")?,
            implicit_wait_secs: parse_lookup(lookup, "IMPLICIT_WAIT_SECS", "3")?,
        };

        let telegram = TelegramConfig {
            bot_token: lookup("TELEGRAM_BOT_TOKEN"),
            channel_id: lookup("TELEGRAM_CHANNEL_ID"),
        };

        let max_cycles: i64 = parse_lookup(lookup, "CYCLES", "5")?;
        let scheduler = SchedulerConfig {
            variant,
            // CYCLES=0 (or negative) means run until terminated.
            max_cycles: u32::try_from(max_cycles).ok().filter(|n| *n > 0),
            cycle_interval: Duration::from_secs(parse_lookup(lookup, "CYCLE_INTERVAL_SECS", "15")?),
            error_backoff: Duration::from_secs(parse_lookup(lookup, "ERROR_BACKOFF_SECS", "10")?),
            history_limit: parse_lookup(lookup, "HISTORY_LIMIT", "50")?,
        };

        Ok(Self {
            site,
            browser,
            telegram,
            scheduler,
            fusion_policy: parse_lookup(lookup, "FUSION_POLICY", "argmax")?,
            database_url: lookup_or(lookup, "DATABASE_URL", DEFAULT_DATABASE_URL),
        })
    }
}

fn lookup_or(lookup: Lookup<'_>, key: &str, default: &str) -> String {
    lookup(key).unwrap_or_else(|| default.to_string())
}

fn parse_lookup<T>(lookup: Lookup<'_>, key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Into<anyhow::Error>,
{
    lookup_or(lookup, key, default)
        .parse::<T>()
        .map_err(Into::into)
        .with_context(|| format!("Invalid value for {key}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::GameVariant;

    // Resolution is tested through injected lookups; the ambient process
    // environment never leaks into these assertions.

    #[test]
    fn test_defaults_without_env() {
        let config = Config::load(&|_| None).expect("defaults should load");
        assert_eq!(config.site.variant, GameVariant::OneMinute);
        assert_eq!(config.scheduler.history_limit, 50);
        assert_eq!(config.fusion_policy, FusionPolicy::ArgMax);
        assert_eq!(config.scheduler.cycle_interval, Duration::from_secs(15));
        assert!(config.telegram.bot_token.is_none());
    }

    #[test]
    fn test_set_variables_take_precedence() {
        let config = Config::load(&|key| match key {
            "GAME_VARIANT" => Some("30S".to_string()),
            "CYCLES" => Some("0".to_string()),
            "HISTORY_LIMIT" => Some("25".to_string()),
            _ => None,
        })
        .expect("overrides should load");
        assert_eq!(config.site.variant, GameVariant::ThirtySeconds);
        assert_eq!(config.scheduler.max_cycles, None);
        assert_eq!(config.scheduler.history_limit, 25);
    }

    #[test]
    fn test_lookup_or_prefers_set_value() {
        let lookup = |key: &str| (key == "SET").then(|| "custom".to_string());
        assert_eq!(lookup_or(&lookup, "SET", "default"), "custom");
        assert_eq!(lookup_or(&lookup, "MISSING", "default"), "default");
    }

    #[test]
    fn test_parse_lookup_rejects_garbage() {
        let result: Result<u64> =
            parse_lookup(&|_| Some("not-a-number".to_string()), "CYCLES", "1");
        assert!(result.is_err());
    }
}
