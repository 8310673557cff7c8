//! Weather types: WeatherSnapshot, Coordinates

use serde::{Deserialize, Serialize};

/// Point-in-time weather used for leaching and timing adjustments.
///
/// Units: temperature °C, humidity %, rainfall mm, wind speed km/h.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    pub temperature: f64,
    pub humidity: f64,
    pub rainfall: f64,
    pub wind_speed: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
}

impl Default for WeatherSnapshot {
    fn default() -> Self {
        Self {
            temperature: 25.0,
            humidity: 60.0,
            rainfall: 0.0,
            wind_speed: 5.0,
            description: "Clear".to_string(),
            location: "Default Location".to_string(),
        }
    }
}

/// WGS84 coordinates in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Latitude within [-90, 90] and longitude within [-180, 180].
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}°N, {:.2}°E", self.lat, self.lon)
    }
}
