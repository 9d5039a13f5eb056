use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Formats as `lat,lon`, the form map services accept as a search query.
impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

/// Weather for one resolved location, built fresh for each successful lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub coordinates: Coordinates,
    pub description: String,
    pub icon_url: String,
    /// Degrees Fahrenheit.
    pub current_temp: f64,
    /// Degrees Fahrenheit.
    pub feels_like_temp: f64,
    /// `"City, CountryCode"`.
    pub place: String,
    pub observed_at: DateTime<Utc>,
}
