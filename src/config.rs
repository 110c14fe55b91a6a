//! Runtime configuration from environment variables.
//!
//! Everything has a default so `pendler serve` works out of the box inside a
//! container; the TomTom key is the only value with no sane fallback and is
//! read from `PENDLER_TOMTOM_KEY`.

use std::time::Duration;

/// Environment override for the Chromium binary path.
pub const CHROMIUM_PATH_ENV: &str = "PENDLER_CHROMIUM_PATH";

/// Aggregator configuration, shared by the scrape driver, the provider
/// adapters, and the server layer.
#[derive(Debug, Clone)]
pub struct Config {
    /// TomTom routing API key.
    pub tomtom_key: String,
    /// Deadline for a single outbound HTTP call.
    pub http_timeout_ms: u64,
    /// Deadline for browser launch + navigation + readiness wait.
    pub scrape_timeout_ms: u64,
    /// Minimum interval between two scrape crawls (enforced by the caller
    /// via `CrawlLimiter`, not by the core).
    pub min_crawl_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tomtom_key: String::new(),
            http_timeout_ms: 15_000,
            scrape_timeout_ms: 45_000,
            min_crawl_interval: Duration::from_secs(60),
        }
    }
}

impl Config {
    /// Read configuration from `PENDLER_*` environment variables, falling
    /// back to defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            tomtom_key: std::env::var("PENDLER_TOMTOM_KEY").unwrap_or_default(),
            http_timeout_ms: env_u64("PENDLER_HTTP_TIMEOUT_MS", defaults.http_timeout_ms),
            scrape_timeout_ms: env_u64("PENDLER_SCRAPE_TIMEOUT_MS", defaults.scrape_timeout_ms),
            min_crawl_interval: Duration::from_secs(env_u64(
                "PENDLER_MIN_CRAWL_INTERVAL_SECS",
                defaults.min_crawl_interval.as_secs(),
            )),
        }
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let c = Config::default();
        assert!(c.http_timeout_ms > 0);
        assert!(c.scrape_timeout_ms > c.http_timeout_ms);
    }
}
