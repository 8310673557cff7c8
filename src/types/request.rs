//! Request envelope accepted at the collaborator boundary, plus input checks.
//!
//! The engine itself never validates. Front ends call
//! [`RecommendationRequest::validate`] (or the per-record checks) before
//! handing data to `RecommendationEngine::compute`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Coordinates, CropHealthAssessment, SoilSample, WeatherSnapshot};

/// Accepted pH range for soil readings.
pub const PH_RANGE: std::ops::RangeInclusive<f64> = 3.0..=14.0;

/// Rejected input, reported back to whoever built the request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("crop type must not be empty")]
    EmptyCropType,

    #[error("pH {0} is outside the accepted range 3.0-14.0")]
    PhOutOfRange(f64),

    #[error("{field} must be a finite, non-negative number (got {value})")]
    NegativeOrNonFinite { field: &'static str, value: f64 },

    #[error("humidity {0} must be within 0-100%")]
    HumidityOutOfRange(f64),

    #[error("temperature {0} is not a finite number")]
    NonFiniteTemperature(f64),

    #[error("invalid coordinates: lat {lat}, lon {lon}")]
    InvalidCoordinates { lat: f64, lon: f64 },

    #[error("no soil data supplied and no region or coordinates to look it up")]
    MissingSoilData,

    #[error("missing required soil parameter: {0}")]
    MissingParameter(&'static str),
}

fn check_non_negative(field: &'static str, value: f64) -> Result<(), InputError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(InputError::NegativeOrNonFinite { field, value })
    }
}

impl SoilSample {
    /// Check pH and nutrient ranges.
    pub fn validate(&self) -> Result<(), InputError> {
        if !PH_RANGE.contains(&self.ph) {
            return Err(InputError::PhOutOfRange(self.ph));
        }
        check_non_negative("nitrogen", self.nitrogen)?;
        check_non_negative("phosphorus", self.phosphorus)?;
        check_non_negative("potassium", self.potassium)?;
        check_non_negative("organicCarbon", self.organic_carbon)?;
        Ok(())
    }
}

impl WeatherSnapshot {
    pub fn validate(&self) -> Result<(), InputError> {
        if !self.temperature.is_finite() {
            return Err(InputError::NonFiniteTemperature(self.temperature));
        }
        if !(0.0..=100.0).contains(&self.humidity) {
            return Err(InputError::HumidityOutOfRange(self.humidity));
        }
        check_non_negative("rainfall", self.rainfall)?;
        check_non_negative("windSpeed", self.wind_speed)?;
        Ok(())
    }
}

/// JSON request read by the `recommend` command.
///
/// Soil and weather may be omitted; the front end fills them from the
/// soil-card and weather providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub crop_type: String,
    #[serde(default)]
    pub soil_data: Option<SoilSample>,
    #[serde(default)]
    pub weather_data: Option<WeatherSnapshot>,
    #[serde(default)]
    pub crop_analysis: Option<CropHealthAssessment>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

impl RecommendationRequest {
    /// Validate everything present in the request.
    ///
    /// Missing soil data is only an error when there is also no region or
    /// coordinates to look it up with.
    pub fn validate(&self) -> Result<(), InputError> {
        if self.crop_type.trim().is_empty() {
            return Err(InputError::EmptyCropType);
        }
        if let Some(c) = &self.coordinates {
            if !c.is_valid() {
                return Err(InputError::InvalidCoordinates { lat: c.lat, lon: c.lon });
            }
        }
        match &self.soil_data {
            Some(soil) => soil.validate()?,
            None if self.region.is_none() && self.coordinates.is_none() => {
                return Err(InputError::MissingSoilData);
            }
            None => {}
        }
        if let Some(weather) = &self.weather_data {
            weather.validate()?;
        }
        Ok(())
    }
}
