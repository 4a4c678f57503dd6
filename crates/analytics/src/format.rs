//! Display formatting for attribute values and statistics.

use chrono::{DateTime, Utc};

/// Shown in place of an average with no data.
pub const NO_DATA: &str = "—";

/// One decimal place, or [`NO_DATA`].
pub fn average(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.1}", v),
        _ => NO_DATA.to_string(),
    }
}

/// Human label for a status code. Unknown codes are returned unchanged.
pub fn status_label(code: &str) -> &str {
    match code {
        "INSVC" => "In Service",
        "REMOVED" => "Removed",
        "PLANNED" => "Planned",
        other => other,
    }
}

pub fn ownership_label(code: &str) -> &str {
    match code {
        "PRIV" => "Private",
        other => other,
    }
}

pub fn condition_label(rating: u8) -> Option<&'static str> {
    match rating {
        5 => Some("Excellent"),
        4 => Some("Great"),
        3 => Some("Good"),
        2 => Some("Fair"),
        1 => Some("Poor"),
        _ => None,
    }
}

pub fn diameter(inches: f64) -> String {
    format!("{} in", inches)
}

/// Four decimals with a degree sign.
pub fn coordinate(degrees: f64) -> String {
    format!("{:.4}°", degrees)
}

/// Calendar date (UTC) of an epoch-milliseconds timestamp.
pub fn date(epoch_ms: f64) -> Option<String> {
    if !epoch_ms.is_finite() {
        return None;
    }
    DateTime::<Utc>::from_timestamp_millis(epoch_ms as i64).map(|dt| dt.format("%Y-%m-%d").to_string())
}

/// Panorama link for a position.
pub fn street_view_url(lon: f64, lat: f64) -> String {
    format!(
        "https://www.google.com/maps/@?api=1&map_action=pano&viewpoint={},{}",
        lat, lon
    )
}
