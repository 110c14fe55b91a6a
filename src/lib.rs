//! Pendler library — commute traffic aggregator.
//!
//! Scrapes a browser-rendered map directions page and queries several
//! unofficial traffic APIs, normalizing all sources into one
//! [`types::CommutingInfo`] record.

pub mod alerts;
pub mod browser;
pub mod clock;
pub mod config;
pub mod error;
pub mod geo;
pub mod http_client;
pub mod limiter;
pub mod parse;
pub mod providers;
pub mod scrape;
pub mod select;
pub mod server;
pub mod types;
