//! Core data model shared by the scrape driver, provider adapters, and the
//! alert filters.

use serde::{Deserialize, Serialize};

/// A WGS84 coordinate pair. Immutable query input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Coarse congestion bucket assigned to a route.
///
/// `Default` is the fallback when no delay marker is recognized in scraped
/// markup — never an error. `Normal` is the constant tag reported by
/// providers that expose a traffic-delay-seconds field but no
/// classification; the markup parser never produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficDelay {
    Default,
    Light,
    Medium,
    Heavy,
    Normal,
}

/// One normalized commute estimate.
///
/// Produced fresh per query and never mutated. A provider call yields either
/// a fully populated record or an error — `distance_km: None` means the
/// source genuinely exposed no distance, not a failed call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommutingInfo {
    /// Travel time in whole minutes, rounded up.
    pub minutes: u32,
    /// Estimated local arrival time, 24-hour `HH:mm`.
    pub eta: String,
    /// Route length in kilometers, one decimal. Absent when the source text
    /// had no recognizable distance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    pub delay: TrafficDelay,
}

/// One DOM row per alternative route on the scraped directions page.
/// Ephemeral — consumed immediately by the text parsers.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTripRow {
    pub text: String,
    pub html: String,
}

/// Origin of an alert feed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSource {
    Police,
    Hazard,
}

/// A filtered hazard/police alert, ready for formatting.
#[derive(Debug, Clone)]
pub struct AlertItem {
    pub road_name: String,
    /// Reporter confidence, 0–5.
    pub confidence: u8,
    pub age_minutes: i64,
    pub source_type: AlertSource,
}

/// The nearest speed camera around a query point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeedCameraItem {
    /// Distance from the query point in kilometers, one decimal.
    pub distance_km: f64,
    /// Posted limit as reported by the feed (free-form, e.g. "30").
    pub speed_limit_kph: String,
    /// Age since the camera was first reported. Only set for
    /// mobile/semi-stationary cameras.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
    /// Age since the last confirmation. Only set for mobile/semi-stationary
    /// cameras.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_confirmed: Option<String>,
}
