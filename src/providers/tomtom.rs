//! TomTom routing adapter.

use super::{duration_hhmm, km_from_meters, minutes_from_seconds};
use crate::clock::{eta_from_now, Clock};
use crate::error::{Error, Result};
use crate::http_client::HttpClient;
use crate::types::{CommutingInfo, GeoPoint, TrafficDelay};
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::sync::Arc;

const DEFAULT_BASE_URL: &str = "https://mydrive.api-system.tomtom.com";

#[derive(Debug, Deserialize)]
struct TomTomResponse {
    routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
struct Route {
    summary: Summary,
    #[serde(default)]
    guidance: Guidance,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Summary {
    length_in_meters: f64,
    travel_time_in_seconds: f64,
    #[serde(default)]
    traffic_delay_in_seconds: f64,
}

#[derive(Debug, Default, Deserialize)]
struct Guidance {
    #[serde(default)]
    instructions: Vec<Instruction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Instruction {
    #[serde(default)]
    road_numbers: Vec<String>,
}

pub struct TomTom {
    http: HttpClient,
    clock: Arc<dyn Clock>,
    base_url: String,
    key: String,
}

impl TomTom {
    pub fn new(http: HttpClient, clock: Arc<dyn Clock>, key: &str) -> Self {
        Self {
            http,
            clock,
            base_url: DEFAULT_BASE_URL.to_string(),
            key: key.to_string(),
        }
    }

    /// Point the adapter at a different host. Test seam.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn route_url(&self, origin: GeoPoint, destination: GeoPoint) -> String {
        format!(
            "{}/routing/1/calculateRoute/{},{}:{},{}/json\
             ?key={}\
             &routeType=fastest\
             &traffic=true\
             &maxAlternatives=1\
             &travelMode=car\
             &instructionsType=tagged\
             &language=de-de\
             &sectionType=carTrain\
             &sectionType=country\
             &sectionType=ferry\
             &sectionType=motorway\
             &sectionType=pedestrian\
             &sectionType=tollRoad\
             &sectionType=tollVignette\
             &sectionType=traffic\
             &sectionType=travelMode\
             &sectionType=tunnel",
            self.base_url,
            origin.latitude,
            origin.longitude,
            destination.latitude,
            destination.longitude,
            self.key
        )
    }

    /// Fetch the fastest route and normalize it.
    pub async fn commute(&self, origin: GeoPoint, destination: GeoPoint) -> Result<CommutingInfo> {
        let url = self.route_url(origin, destination);
        let resp = self.http.get(&url).await?;
        if !resp.is_success() {
            return Err(Error::ProviderRequest(format!(
                "tomtom answered {}",
                resp.status
            )));
        }

        let parsed: TomTomResponse = serde_json::from_str(&resp.body)
            .map_err(|e| Error::ProviderShape(format!("tomtom body: {e}")))?;

        for route in &parsed.routes {
            tracing::debug!(
                "tomtom: {:.1}km, {}, +{}",
                route.summary.length_in_meters / 1000.0,
                duration_hhmm(route.summary.travel_time_in_seconds),
                duration_hhmm(route.summary.traffic_delay_in_seconds)
            );
            let highways = commute_highways(route);
            if !highways.is_empty() {
                tracing::debug!("tomtom: über {}", highways.join(", "));
            }
        }

        let best = parsed
            .routes
            .first()
            .ok_or_else(|| Error::ProviderShape("tomtom returned no routes".into()))?;

        let minutes = minutes_from_seconds(best.summary.travel_time_in_seconds);
        Ok(CommutingInfo {
            minutes,
            eta: eta_from_now(self.clock.as_ref(), minutes),
            distance_km: Some(km_from_meters(best.summary.length_in_meters)),
            delay: TrafficDelay::Normal,
        })
    }
}

/// Road numbers of the guidance instructions that lie on the commute
/// highways, de-duplicated. Diagnostic logging only.
fn commute_highways(route: &Route) -> Vec<String> {
    let highway_re = Regex::new(r"^A(3|40|42|57)$").expect("highway regex is valid");
    let unique: BTreeSet<&str> = route
        .guidance
        .instructions
        .iter()
        .flat_map(|instruction| instruction.road_numbers.iter())
        .filter(|no| highway_re.is_match(no))
        .map(String::as_str)
        .collect();
    unique.into_iter().map(str::to_string).collect()
}
