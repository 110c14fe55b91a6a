//! Provider adapters for the unofficial traffic JSON APIs.
//!
//! Each adapter builds its provider-specific request, issues the call, and
//! maps the first route/alternative into a [`CommutingInfo`]. A provider
//! either returns a fully populated record or an error — there is no
//! zero-filled fallback.

pub mod gmaps;
pub mod tomtom;
pub mod waze;

use crate::clock::Clock;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::http_client::HttpClient;
use crate::types::{CommutingInfo, GeoPoint};
use std::sync::Arc;

/// Travel seconds to whole minutes, rounded up.
pub(crate) fn minutes_from_seconds(seconds: f64) -> u32 {
    (seconds / 60.0).ceil() as u32
}

/// Route meters to kilometers, one decimal.
pub(crate) fn km_from_meters(meters: f64) -> f64 {
    (meters / 100.0).round() / 10.0
}

/// Render seconds as `HH:MM` for diagnostic log lines.
pub(crate) fn duration_hhmm(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{:02}:{:02}", total / 3600, (total % 3600) / 60)
}

/// All configured providers behind one dispatch point.
pub struct ProviderSet {
    tomtom: tomtom::TomTom,
    waze: waze::Waze,
    gmaps: gmaps::GoogleMaps,
}

impl ProviderSet {
    pub fn new(config: &Config, clock: Arc<dyn Clock>) -> Self {
        let http = HttpClient::new(config.http_timeout_ms);
        Self {
            tomtom: tomtom::TomTom::new(http.clone(), Arc::clone(&clock), &config.tomtom_key),
            waze: waze::Waze::new(http.clone(), Arc::clone(&clock)),
            gmaps: gmaps::GoogleMaps::new(http, clock),
        }
    }

    /// Fetch one provider's estimate by name (`tomtom`, `waze`, `gmaps`).
    ///
    /// Providers are independent: callers may invoke several concurrently
    /// and one provider's failure never blocks another's result.
    pub async fn fetch(
        &self,
        name: &str,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<CommutingInfo> {
        match name {
            "tomtom" => self.tomtom.commute(origin, destination).await,
            "waze" => self.waze.commute(origin, destination).await,
            "gmaps" => self.gmaps.commute(origin, destination).await,
            other => Err(Error::ProviderRequest(format!("unknown provider: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minutes_round_up() {
        assert_eq!(minutes_from_seconds(1800.0), 30);
        assert_eq!(minutes_from_seconds(1801.0), 31);
        assert_eq!(minutes_from_seconds(59.0), 1);
        assert_eq!(minutes_from_seconds(0.0), 0);
    }

    #[test]
    fn km_one_decimal() {
        assert_eq!(km_from_meters(12000.0), 12.0);
        assert_eq!(km_from_meters(63_749.0), 63.7);
        assert_eq!(km_from_meters(63_750.0), 63.8);
    }

    #[test]
    fn hhmm_rendering() {
        assert_eq!(duration_hhmm(1800.0), "00:30");
        assert_eq!(duration_hhmm(4500.0), "01:15");
    }
}
