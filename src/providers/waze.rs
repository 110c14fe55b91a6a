//! Waze live-map routing adapter.

use super::{duration_hhmm, km_from_meters, minutes_from_seconds};
use crate::clock::{eta_from_now, Clock};
use crate::error::{Error, Result};
use crate::http_client::HttpClient;
use crate::types::{CommutingInfo, GeoPoint, TrafficDelay};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

const DEFAULT_BASE_URL: &str = "https://www.waze.com";

#[derive(Debug, Deserialize)]
struct WazeResponse {
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    response: RouteResponse,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RouteResponse {
    #[serde(default)]
    is_fastest: bool,
    #[serde(default)]
    jams: Vec<serde_json::Value>,
    #[serde(default)]
    route_name: String,
    total_length: f64,
    total_seconds: f64,
}

pub struct Waze {
    http: HttpClient,
    clock: Arc<dyn Clock>,
    base_url: String,
}

impl Waze {
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

    /// Fetch the route alternatives and normalize the first one.
    pub async fn commute(&self, origin: GeoPoint, destination: GeoPoint) -> Result<CommutingInfo> {
        let url = format!("{}/live-map/api/user-drive?geo_env=row", self.base_url);
        // Waze wants x/y, not lng/lat names.
        let body = json!({
            "from": { "y": origin.latitude, "x": origin.longitude },
            "to": { "y": destination.latitude, "x": destination.longitude },
            "nPaths": 3,
            "useCase": "LIVEMAP_PLANNING",
            "interval": 15,
            "arriveAt": true,
        });

        let resp = self.http.post_json(&url, &body).await?;
        if !resp.is_success() {
            return Err(Error::ProviderRequest(format!(
                "waze answered {}",
                resp.status
            )));
        }

        let parsed: WazeResponse = serde_json::from_str(&resp.body)
            .map_err(|e| Error::ProviderShape(format!("waze body: {e}")))?;

        for alternative in &parsed.alternatives {
            let r = &alternative.response;
            tracing::debug!(
                "waze: {:.1}km, {}, Staus: {}, schnellste: {}",
                r.total_length / 1000.0,
                duration_hhmm(r.total_seconds),
                r.jams.len(),
                r.is_fastest
            );
            tracing::debug!("waze: über {}", r.route_name);
        }

        let best = parsed
            .alternatives
            .first()
            .ok_or_else(|| Error::ProviderShape("waze returned no alternatives".into()))?;

        let minutes = minutes_from_seconds(best.response.total_seconds);
        Ok(CommutingInfo {
            minutes,
            eta: eta_from_now(self.clock.as_ref(), minutes),
            distance_km: Some(km_from_meters(best.response.total_length)),
            delay: TrafficDelay::Normal,
        })
    }
}
