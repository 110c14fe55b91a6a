//! Speed-camera feed: bounding-box query, nearest camera wins.

use crate::clock::{age_days_hours_or_minutes, age_hours_or_minutes, Clock};
use crate::error::{Error, Result};
use crate::geo;
use crate::http_client::HttpClient;
use crate::types::{GeoPoint, SpeedCameraItem};
use chrono::{DateTime, Local, NaiveDate, NaiveTime};
use regex::Regex;
use serde::Deserialize;
use std::sync::Arc;

const DEFAULT_BASE_URL: &str = "https://cdn3.atudo.net";

/// Bounding-box half-width in degrees. Much tighter than the alert feed —
/// only cameras on the immediate route matter.
const DELTA: f64 = 0.01;

/// Feed type code for mobile/semi-stationary cameras, the only kind whose
/// ages are reported.
const MOBILE_CAMERA_TYPE: &str = "1";

#[derive(Debug, Deserialize)]
struct PoisResponse {
    #[serde(default)]
    pois: Vec<Poi>,
}

#[derive(Debug, Deserialize)]
struct Poi {
    #[serde(default)]
    confirm_date: String,
    #[serde(default)]
    create_date: String,
    lat: String,
    lng: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    vmax: String,
}

pub struct SpeedCameras {
    http: HttpClient,
    clock: Arc<dyn Clock>,
    base_url: String,
}

impl SpeedCameras {
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

    /// Fetch the nearest speed camera around a point, if the feed has any.
    pub async fn fetch_nearest(&self, point: GeoPoint) -> Result<Option<SpeedCameraItem>> {
        let url = format!(
            "{}/api/4.0/pois.php\
             ?type=101,102,103,104,105,106,107,108,109,110,111,112,113,115,114,ts,0,1,2,3,4,5,6\
             &z=10\
             &box={},{},{},{}",
            self.base_url,
            point.latitude - DELTA,
            point.longitude - DELTA,
            point.latitude + DELTA,
            point.longitude + DELTA,
        );

        let resp = self.http.get(&url).await?;
        if !resp.is_success() {
            return Err(Error::ProviderRequest(format!(
                "camera feed answered {}",
                resp.status
            )));
        }

        let parsed: PoisResponse = serde_json::from_str(&resp.body)
            .map_err(|e| Error::ProviderShape(format!("camera feed body: {e}")))?;

        Ok(nearest(&parsed.pois, point, self.clock.now()))
    }
}

/// Pick the nearest camera with a computable position.
fn nearest(pois: &[Poi], point: GeoPoint, now: DateTime<Local>) -> Option<SpeedCameraItem> {
    let mut best: Option<(f64, &Poi)> = None;
    for poi in pois {
        let (Ok(lat), Ok(lng)) = (poi.lat.parse::<f64>(), poi.lng.parse::<f64>()) else {
            continue;
        };
        let distance = geo::distance_km(point, GeoPoint::new(lat, lng));
        tracing::debug!(
            "camera: typ: {}, vmax: {}, {:.1}km, since: {}",
            poi.kind,
            poi.vmax,
            distance,
            poi.create_date
        );
        match best {
            Some((current, _)) if current <= distance => {}
            _ => best = Some((distance, poi)),
        }
    }

    let (distance, poi) = best?;
    let (since, last_confirmed) = if poi.kind == MOBILE_CAMERA_TYPE {
        (
            parse_feed_date(&poi.create_date, now).map(|d| age_days_hours_or_minutes(now, d)),
            parse_feed_date(&poi.confirm_date, now).map(|d| age_hours_or_minutes(now, d)),
        )
    } else {
        (None, None)
    };

    Some(SpeedCameraItem {
        distance_km: (distance * 10.0).round() / 10.0,
        speed_limit_kph: poi.vmax.clone(),
        since,
        last_confirmed,
    })
}

/// Feed timestamps come as `"HH:mm"` (today) or `"dd.MM.yyyy"`. Anything
/// else is logged and dropped — a missing age never fails the query.
fn parse_feed_date(value: &str, now: DateTime<Local>) -> Option<DateTime<Local>> {
    let time_re = Regex::new(r"^\d{2}:\d{2}$").expect("time regex is valid");
    let day_re = Regex::new(r"^\d{2}\.\d{2}\.\d{4}$").expect("day regex is valid");

    if time_re.is_match(value) {
        let time = NaiveTime::parse_from_str(value, "%H:%M").ok()?;
        return now.date_naive().and_time(time).and_local_timezone(Local).single();
    }
    if day_re.is_match(value) {
        let date = NaiveDate::parse_from_str(value, "%d.%m.%Y").ok()?;
        return date
            .and_time(NaiveTime::MIN)
            .and_local_timezone(Local)
            .single();
    }
    tracing::warn!(value, "unrecognized camera feed date");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 9, 11, 34, 0).unwrap()
    }

    fn poi(kind: &str, lat: f64, lng: f64, vmax: &str, created: &str, confirmed: &str) -> Poi {
        Poi {
            confirm_date: confirmed.to_string(),
            create_date: created.to_string(),
            lat: lat.to_string(),
            lng: lng.to_string(),
            kind: kind.to_string(),
            vmax: vmax.to_string(),
        }
    }

    const POINT: GeoPoint = GeoPoint {
        latitude: 51.5,
        longitude: 6.9,
    };

    #[test]
    fn empty_feed_yields_none() {
        assert_eq!(nearest(&[], POINT, now()), None);
    }

    #[test]
    fn nearest_camera_wins() {
        let pois = vec![
            poi("107", 51.55, 6.95, "100", "", ""),
            poi("107", 51.501, 6.901, "30", "", ""),
        ];
        let item = nearest(&pois, POINT, now()).unwrap();
        assert_eq!(item.speed_limit_kph, "30");
        assert!(item.distance_km < 0.5);
    }

    #[test]
    fn unparseable_positions_are_skipped() {
        let mut broken = poi("107", 0.0, 0.0, "50", "", "");
        broken.lat = "n/a".to_string();
        let pois = vec![broken, poi("107", 51.501, 6.901, "70", "", "")];
        let item = nearest(&pois, POINT, now()).unwrap();
        assert_eq!(item.speed_limit_kph, "70");
    }

    #[test]
    fn mobile_camera_reports_ages() {
        let pois = vec![poi("1", 51.501, 6.901, "50", "09:30", "11:20")];
        let item = nearest(&pois, POINT, now()).unwrap();
        assert_eq!(item.since.as_deref(), Some("2h"));
        assert_eq!(item.last_confirmed.as_deref(), Some("14min"));
    }

    #[test]
    fn mobile_camera_day_old_reports_days() {
        let pois = vec![poi("1", 51.501, 6.901, "50", "07.03.2026", "10:00")];
        let item = nearest(&pois, POINT, now()).unwrap();
        assert_eq!(item.since.as_deref(), Some("2d"));
        assert_eq!(item.last_confirmed.as_deref(), Some("1h"));
    }

    #[test]
    fn stationary_camera_has_no_ages() {
        let pois = vec![poi("107", 51.501, 6.901, "100", "09:30", "11:20")];
        let item = nearest(&pois, POINT, now()).unwrap();
        assert_eq!(item.since, None);
        assert_eq!(item.last_confirmed, None);
    }

    #[test]
    fn garbage_dates_leave_ages_absent() {
        let pois = vec![poi("1", 51.501, 6.901, "50", "01.01.1970 11:00", "???")];
        let item = nearest(&pois, POINT, now()).unwrap();
        assert_eq!(item.since, None);
        assert_eq!(item.last_confirmed, None);
    }
}
