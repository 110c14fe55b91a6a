//! Minimum-interval limiter for scrape crawls.
//!
//! Owned by the caller, not the core: the server layer keeps one instance
//! behind a mutex and asks it before every crawl, so there is no hidden
//! cross-request state inside the pipeline.

use std::time::{Duration, Instant};

/// Enforces a minimum interval between two crawls.
#[derive(Debug)]
pub struct CrawlLimiter {
    min_interval: Duration,
    last: Option<Instant>,
}

impl CrawlLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: None,
        }
    }

    /// Try to start a crawl at `now`. Records the crawl instant on success;
    /// a denied attempt leaves the window untouched.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.duration_since(last) < self.min_interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    /// Time until the next crawl is allowed, zero when ready.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last {
            Some(last) => self
                .min_interval
                .saturating_sub(now.duration_since(last)),
            None => Duration::ZERO,
        }
    }
}
