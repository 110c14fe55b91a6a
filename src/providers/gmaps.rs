//! Google Maps preview-directions adapter.
//!
//! The endpoint answers JSON hidden behind a 4-character anti-hijacking
//! prefix, and the payload is a positional array with no field names. All
//! positional access goes through the named accessors in [`decode`] so a
//! shape change fails loudly at one boundary instead of producing a wrong
//! number downstream.

use super::{duration_hhmm, km_from_meters, minutes_from_seconds};
use crate::clock::{eta_from_now, Clock};
use crate::error::{Error, Result};
use crate::http_client::HttpClient;
use crate::types::{CommutingInfo, GeoPoint, TrafficDelay};
use std::sync::Arc;

const DEFAULT_BASE_URL: &str = "https://www.google.de";

/// Index-to-class table for the embedded traffic-type field.
const TRAFFIC_TYPES: [TrafficDelay; 4] = [
    TrafficDelay::Default,
    TrafficDelay::Light,
    TrafficDelay::Medium,
    TrafficDelay::Heavy,
];

pub struct GoogleMaps {
    http: HttpClient,
    clock: Arc<dyn Clock>,
    base_url: String,
}

impl GoogleMaps {
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

    fn preview_url(&self, origin: GeoPoint, destination: GeoPoint) -> String {
        // The pb parameter is an opaque protobuf-ish blob captured from the
        // map UI; only the four coordinate slots vary.
        format!(
            "{}/maps/preview/directions?authuser=0&hl=de&gl=de\
             &pb=!1m4!3m2!3d{}!4d{}!6e2!1m4!3m2!3d{}!4d{}!6e2\
             !3m9!1m3!1d68734.00686075684!2d6.6666666666666!3d55.555555555555\
             !2m0!3m2!1i2156!2i1329!4f13.1\
             !6m23!1m1!18b1!2m3!5m1!6e2!20e3!6m8!4b1!49b1!74i150000!75b1!85b1!89b1!114b1!149b1!10b1!14b1!16b1!17m1!3e1!20m2!1e0!2e3\
             !8m0!15m4!1s91jAY5GfFNyAi-gPq9Sf4Ao!4m1!2i5620!7e81!20m28!1m6!1m2!1i0!2i0!2m2!1i458!2i1329!1m6!1m2!1i2106!2i0!2m2!1i2156!2i1329!1m6!1m2!1i0!2i0!2m2!1i2156!2i20!1m6!1m2!1i0!2i1309!2m2!1i2156!2i1329!27b1!28m0!40i629",
            self.base_url,
            origin.latitude,
            origin.longitude,
            destination.latitude,
            destination.longitude
        )
    }

    /// Fetch the preview directions and normalize the first route.
    pub async fn commute(&self, origin: GeoPoint, destination: GeoPoint) -> Result<CommutingInfo> {
        let url = self.preview_url(origin, destination);
        let resp = self.http.get(&url).await?;
        if !resp.is_success() {
            return Err(Error::ProviderRequest(format!(
                "google maps answered {}",
                resp.status
            )));
        }

        let root = decode::parse_prefixed_body(&resp.body)?;
        let routes = decode::routes(&root)?;

        for route in routes {
            tracing::debug!(
                "gmaps: {} via {:.1}km, {}, {:?}",
                decode::route_name(route).unwrap_or("?"),
                decode::distance_meters(route)? / 1000.0,
                duration_hhmm(decode::duration_seconds(route)?),
                decode::traffic_delay(route)?
            );
        }

        let best = routes
            .first()
            .ok_or_else(|| Error::ProviderShape("google maps returned no routes".into()))?;

        let minutes = minutes_from_seconds(decode::duration_seconds(best)?);
        Ok(CommutingInfo {
            minutes,
            eta: eta_from_now(self.clock.as_ref(), minutes),
            distance_km: Some(km_from_meters(decode::distance_meters(best)?)),
            delay: decode::traffic_delay(best)?,
        })
    }
}

/// Named accessors over the positional route payload.
mod decode {
    use super::TRAFFIC_TYPES;
    use crate::error::{Error, Result};
    use crate::types::TrafficDelay;
    use serde_json::Value;

    /// Strip the fixed 4-character prefix and parse the remainder as JSON.
    pub fn parse_prefixed_body(body: &str) -> Result<Value> {
        let mut chars = body.char_indices();
        let start = chars
            .nth(4)
            .map(|(i, _)| i)
            .ok_or_else(|| Error::ProviderShape("body shorter than its prefix".into()))?;
        serde_json::from_str(&body[start..])
            .map_err(|e| Error::ProviderShape(format!("prefixed body: {e}")))
    }

    /// The route list lives at `root[0][1]`.
    pub fn routes(root: &Value) -> Result<&Vec<Value>> {
        at(root, &[0, 1], "route list")?
            .as_array()
            .ok_or_else(|| shape("route list", "not an array"))
    }

    /// `route[0][1]` — display name, logging only.
    pub fn route_name(route: &Value) -> Option<&str> {
        at(route, &[0, 1], "route name").ok()?.as_str()
    }

    /// `route[0][2][0]` — length in meters.
    pub fn distance_meters(route: &Value) -> Result<f64> {
        number(route, &[0, 2, 0], "distance")
    }

    /// `route[0][10][0][0]` — travel time in seconds.
    pub fn duration_seconds(route: &Value) -> Result<f64> {
        number(route, &[0, 10, 0, 0], "duration")
    }

    /// `route[0][10][1]` — traffic-type index mapped through the fixed
    /// 4-entry table.
    pub fn traffic_delay(route: &Value) -> Result<TrafficDelay> {
        let index = number(route, &[0, 10, 1], "traffic type")? as usize;
        TRAFFIC_TYPES
            .get(index)
            .copied()
            .ok_or_else(|| shape("traffic type", "index out of range"))
    }

    fn number(v: &Value, path: &[usize], what: &str) -> Result<f64> {
        at(v, path, what)?
            .as_f64()
            .ok_or_else(|| shape(what, "not a number"))
    }

    fn at<'a>(v: &'a Value, path: &[usize], what: &str) -> Result<&'a Value> {
        let mut current = v;
        for &index in path {
            current = current
                .get(index)
                .ok_or_else(|| shape(what, &format!("missing index {index}")))?;
        }
        Ok(current)
    }

    fn shape(what: &str, problem: &str) -> Error {
        Error::ProviderShape(format!("google maps {what}: {problem}"))
    }
}
