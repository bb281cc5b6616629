//! Metadata attached to single-event detail responses.
//!
//! The lookups themselves live behind the provider traits; this module
//! only defines the shapes and the one piece of logic that needs no
//! remote call, the weekend flag.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair for forecast lookups.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Creates a point from latitude and longitude in degrees.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A one-day forecast summary, pre-formatted for display.
///
/// The condition keeps its upstream wire name `weather`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// e.g. `"22 C"`.
    pub temperature: String,
    /// e.g. `"60%"`.
    pub humidity: String,
    /// e.g. `"3 KM"`.
    pub wind_speed: String,
    /// Condition summary, e.g. `"clear"`.
    #[serde(rename = "weather")]
    pub condition: String,
}

/// The `_metadata` block of an event detail.
///
/// `holiday` and the weather block degrade independently: either may be
/// absent without affecting the other. The weather fields flatten into
/// the object rather than nesting.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventMetadata {
    pub holiday: Option<String>,
    pub weekend: bool,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub weather: Option<WeatherSnapshot>,
}

impl EventMetadata {
    /// Assembles metadata for an event on `date`.
    pub fn new(date: NaiveDate, holiday: Option<String>, weather: Option<WeatherSnapshot>) -> Self {
        Self {
            holiday,
            weekend: is_weekend(date),
            weather,
        }
    }
}

/// Saturday or Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
