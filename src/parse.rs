//! Free-text parsers for scraped trip rows.
//!
//! The directions page renders German UI copy ("1 Std. 10 Min.", "63,7 km")
//! with a narrow no-break space between the number and its unit. That
//! character cannot be matched literally, so every pattern matches the
//! digits followed by one arbitrary character and then the unit marker.

use crate::types::TrafficDelay;
use regex::Regex;

/// Parse a trip duration into whole minutes.
///
/// Scans for an hour marker (`Std.`/`h`) and a minute marker (`Min.`/`min`)
/// independently; a missing marker contributes 0. Text with neither marker
/// parses to 0 — an unrecognized duration is not an error.
pub fn parse_duration(text: &str) -> u32 {
    let hours_re = Regex::new(r"(\d+).(?:Std\.|h)").expect("hours regex is valid");
    let minutes_re = Regex::new(r"(\d+).(?:Min\.|min)").expect("minutes regex is valid");

    let mut duration = 0u32;
    if let Some(caps) = hours_re.captures(text) {
        if let Ok(hours) = caps[1].parse::<u32>() {
            duration += hours * 60;
        }
    }
    if let Some(caps) = minutes_re.captures(text) {
        if let Ok(minutes) = caps[1].parse::<u32>() {
            duration += minutes;
        }
    }
    duration
}

/// Parse a trip distance into kilometers.
///
/// Tries the kilometer form first ("1,0 km", "63,7 km", "163 km"; the comma
/// is a German decimal separator), then the meter form ("450 m" at a line
/// end). Returns `None` when neither matches so callers can distinguish
/// "could not parse" from a genuine zero-length route.
pub fn parse_distance(text: &str) -> Option<f64> {
    let km_re = Regex::new(r"(\d+,?\d+).km").expect("km regex is valid");
    if let Some(caps) = km_re.captures(text) {
        return caps[1].replace(',', ".").parse::<f64>().ok();
    }

    let m_re = Regex::new(r"(\d+).m\n").expect("m regex is valid");
    if let Some(caps) = m_re.captures(text) {
        return caps[1].parse::<f64>().ok().map(|m| m / 1000.0);
    }

    None
}

/// Decode the congestion class from a trip row's inner markup.
///
/// The page encodes congestion as a `delay-*` CSS class somewhere in the
/// row. Severity wins when several markers appear: heavy over medium over
/// light. No marker at all yields `Default`.
pub fn parse_delay_class(html: &str) -> TrafficDelay {
    if html.contains("delay-heavy") {
        TrafficDelay::Heavy
    } else if html.contains("delay-medium") {
        TrafficDelay::Medium
    } else if html.contains("delay-light") {
        TrafficDelay::Light
    } else {
        TrafficDelay::Default
    }
}
