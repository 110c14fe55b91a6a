//! Police alert feed: bounding-box query, Autobahn filter, age window.

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::geo;
use crate::http_client::HttpClient;
use crate::types::{AlertItem, AlertSource, GeoPoint};
use chrono::{DateTime, Local, TimeZone};
use regex::Regex;
use serde::Deserialize;
use std::sync::Arc;

const DEFAULT_BASE_URL: &str = "https://www.waze.com";

/// Bounding-box half-width in degrees for the alert feed.
const DELTA: f64 = 0.09;

/// Alerts older than this are stale and dropped.
const MAX_AGE_HOURS: i64 = 12;

#[derive(Debug, Deserialize)]
struct AlertsResponse {
    #[serde(default)]
    alerts: Vec<Alert>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Alert {
    #[serde(default)]
    confidence: u8,
    location: Location,
    pub_millis: i64,
    #[serde(default)]
    n_thumbs_up: u32,
    #[serde(default)]
    street: Option<String>,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    report_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Location {
    x: f64,
    y: f64,
}

pub struct PoliceAlerts {
    http: HttpClient,
    clock: Arc<dyn Clock>,
    base_url: String,
}

impl PoliceAlerts {
    pub fn new(http: HttpClient, clock: Arc<dyn Clock>) -> Self {
        Self {
            http,
            clock,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the adapter at a different host. Test seam.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Fetch and format the police alerts around a point.
    pub async fn fetch(&self, point: GeoPoint) -> Result<Vec<String>> {
        let url = format!(
            "{}/row-rtserver/web/TGeoRSS\
             ?bottom={}&left={}&ma=200&mj=200&mu=20&right={}&top={}\
             &types=alerts%2Ctraffic",
            self.base_url,
            point.latitude - DELTA,
            point.longitude - DELTA,
            point.longitude + DELTA,
            point.latitude + DELTA,
        );

        let resp = self.http.get(&url).await?;
        if !resp.is_success() {
            return Err(Error::ProviderRequest(format!(
                "alert feed answered {}",
                resp.status
            )));
        }

        let parsed: AlertsResponse = serde_json::from_str(&resp.body)
            .map_err(|e| Error::ProviderShape(format!("alert feed body: {e}")))?;

        let now = self.clock.now();
        log_raw_alerts(&parsed.alerts, point);
        Ok(filter(&parsed.alerts, now).iter().map(format_alert).collect())
    }
}

/// Road-name policy: an alert counts when its street carries any Autobahn
/// number (`A` followed by digits); the captured number becomes the display
/// name, so "A42 > Dortmund" renders as "A42".
fn match_road(street: &str) -> Option<String> {
    let road_re = Regex::new(r"(A\d+)").expect("road regex is valid");
    road_re
        .captures(street)
        .map(|caps| caps[1].to_string())
}

/// Keep POLICE alerts on a matching road, at most 12 hours old.
fn filter(alerts: &[Alert], now: DateTime<Local>) -> Vec<AlertItem> {
    alerts
        .iter()
        .filter(|alert| alert.kind == "POLICE")
        .filter_map(|alert| {
            let road_name = match_road(alert.street.as_deref()?)?;
            let published = Local.timestamp_millis_opt(alert.pub_millis).single()?;
            let age_minutes = (now - published).num_minutes();
            if (now - published).num_hours() > MAX_AGE_HOURS {
                return None;
            }
            Some(AlertItem {
                road_name,
                confidence: alert.confidence,
                age_minutes,
                source_type: AlertSource::Police,
            })
        })
        .collect()
}

/// `"<road> vor <age> (<confidence>)"`, age in hours when at least one full
/// hour has passed.
fn format_alert(item: &AlertItem) -> String {
    let age = if item.age_minutes >= 60 {
        format!("{}h", item.age_minutes / 60)
    } else {
        format!("{}min", item.age_minutes)
    };
    format!("{} vor {} ({})", item.road_name, age, item.confidence)
}

fn log_raw_alerts(alerts: &[Alert], point: GeoPoint) {
    for alert in alerts
        .iter()
        .filter(|a| a.kind == "POLICE" || a.kind == "HAZARD")
    {
        let distance = geo::distance_km(point, GeoPoint::new(alert.location.y, alert.location.x));
        tracing::debug!(
            "alert: typ: {}, street: {}, {:.1}km, confidence: {}, thumbsUp: {}, description: {}",
            alert.kind,
            alert.street.as_deref().unwrap_or("?"),
            distance,
            alert.confidence,
            alert.n_thumbs_up,
            alert.report_description.as_deref().unwrap_or("")
        );
    }
}
