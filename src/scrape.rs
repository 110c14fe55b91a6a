//! Crawl driver for the browser-rendered directions page.
//!
//! One crawl is a fixed sequence: launch, navigate to the route URL, dismiss
//! the consent dialog if present, wait for the first trip row as the sole
//! readiness signal, extract all trip rows, close the browser. The close is
//! unconditional — success, navigation error, extraction error, and timeout
//! all release the session before anything is returned to the caller.

use crate::browser::{BrowserLauncher, DirectionsBrowser};
use crate::clock::{eta_from_now, Clock};
use crate::error::{Error, Result};
use crate::parse::{parse_delay_class, parse_distance, parse_duration};
use crate::types::{CommutingInfo, GeoPoint, RawTripRow};
use std::time::Duration;

/// Id prefix of a trip row on the directions page.
pub const TRIP_ROW_PREFIX: &str = "section-directions-trip-";

/// Readiness signal: the first trip row has rendered.
const FIRST_TRIP_SELECTOR: &str = "#section-directions-trip-0";

/// Consent dialog accept-all button, looked up by label text.
const CONSENT_XPATH: &str = r#".//button/span[contains(text(), "Alle akzeptieren")]"#;

/// Collects every trip row whose id is exactly `prefix + one digit`,
/// excluding nested elements that share the prefix.
const EXTRACT_ROWS_JS: &str = r#"
(() => {
  const PREFIX = 'section-directions-trip-';
  return Array.from(document.querySelectorAll(`[id^="${PREFIX}"]`))
    .filter((e) => e.id.match(new RegExp(`${PREFIX}\\d$`)))
    .map((row) => ({ text: row.innerText, html: row.innerHTML }));
})()
"#;

/// Directions-page route URL for an origin/destination pair.
pub fn route_url(origin: GeoPoint, destination: GeoPoint) -> String {
    format!(
        "https://www.google.de/maps/dir/{},{}/{},{}/data=!3m1!4b1!4m2!4m1!3e0",
        origin.latitude, origin.longitude, destination.latitude, destination.longitude
    )
}

/// Scrape all alternative routes for one origin/destination pair.
///
/// Returns the routes in page order, which is the provider's own
/// "best first" ranking. The browser session acquired here is released on
/// every exit path before this function returns.
pub async fn crawl(
    launcher: &dyn BrowserLauncher,
    clock: &dyn Clock,
    origin: GeoPoint,
    destination: GeoPoint,
    timeout_ms: u64,
) -> Result<Vec<CommutingInfo>> {
    let browser = launcher.launch().await?;

    let outcome = tokio::time::timeout(
        Duration::from_millis(timeout_ms),
        extract_rows(&*browser, origin, destination),
    )
    .await;

    tracing::debug!("closing browser");
    if let Err(e) = browser.close().await {
        tracing::warn!(error = %e, "browser close failed");
    }

    let rows = match outcome {
        Ok(Ok(rows)) => rows,
        Ok(Err(e)) => return Err(e.scrape_wrap()),
        Err(_) => return Err(Error::Timeout(timeout_ms, "scrape crawl".into())),
    };

    Ok(rows.iter().map(|row| trip_from_row(clock, row)).collect())
}

/// Navigation and extraction body, bounded by the caller's deadline.
async fn extract_rows(
    browser: &dyn DirectionsBrowser,
    origin: GeoPoint,
    destination: GeoPoint,
) -> Result<Vec<RawTripRow>> {
    let page = browser.new_page().await?;

    let url = route_url(origin, destination);
    tracing::info!(url = %url, "navigating to directions page");
    page.goto(&url).await?;

    if page.click_first(CONSENT_XPATH).await? {
        tracing::debug!("dismissed consent dialog");
    }

    tracing::debug!(selector = FIRST_TRIP_SELECTOR, "waiting for first trip");
    page.wait_for_selector(FIRST_TRIP_SELECTOR).await?;

    let value = page.evaluate(EXTRACT_ROWS_JS).await?;
    let rows: Vec<RawTripRow> = serde_json::from_value(value)
        .map_err(|e| Error::Extraction(format!("trip rows did not deserialize: {e}")))?;

    if rows.is_empty() {
        return Err(Error::Extraction(format!(
            "no rows matched id prefix {TRIP_ROW_PREFIX}"
        )));
    }
    Ok(rows)
}

fn trip_from_row(clock: &dyn Clock, row: &RawTripRow) -> CommutingInfo {
    let minutes = parse_duration(&row.text);
    let distance_km = parse_distance(&row.text);
    let delay = parse_delay_class(&row.html);
    tracing::debug!(minutes, ?distance_km, ?delay, "parsed trip row");
    CommutingInfo {
        minutes,
        eta: eta_from_now(clock, minutes),
        distance_km,
        delay,
    }
}
