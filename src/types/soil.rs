//! Soil types: SoilType, SoilSample, SoilHealthCard

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// Soil Texture Class
// ============================================================================

/// Soil texture class. Drives nutrient retention multipliers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SoilType {
    #[serde(alias = "sand")]
    Sandy,
    #[default]
    #[serde(alias = "loam")]
    Loamy,
    #[serde(alias = "clay")]
    Clayey,
    #[serde(alias = "silt")]
    Silty,
}

impl SoilType {
    pub const ALL: [SoilType; 4] = [Self::Sandy, Self::Loamy, Self::Clayey, Self::Silty];

    pub fn as_str(&self) -> &'static str {
        match self {
            SoilType::Sandy => "sandy",
            SoilType::Loamy => "loamy",
            SoilType::Clayey => "clayey",
            SoilType::Silty => "silty",
        }
    }
}

impl std::fmt::Display for SoilType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Soil Sample (engine input)
// ============================================================================

/// Soil chemistry at a location.
///
/// Built by a caller from a sensor lookup, manual entry or a soil health
/// card. Nutrient levels are parts-per-million, organic carbon is percent
/// by mass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoilSample {
    pub soil_type: SoilType,
    #[serde(rename = "pH", alias = "ph")]
    pub ph: f64,
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    pub organic_carbon: f64,
}

impl Default for SoilSample {
    fn default() -> Self {
        Self {
            soil_type: SoilType::Loamy,
            ph: 7.0,
            nitrogen: 0.0,
            phosphorus: 0.0,
            potassium: 0.0,
            organic_carbon: 1.0,
        }
    }
}

// ============================================================================
// Soil Health Card
// ============================================================================

/// Regional soil health card record.
///
/// Carries the macronutrient sample plus the secondary readings printed on
/// the card (EC, sulfur, micronutrients). Only `sample` feeds the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoilHealthCard {
    pub card_number: String,
    pub location: String,
    #[serde(flatten)]
    pub sample: SoilSample,
    /// dS/m
    pub electrical_conductivity: f64,
    pub sulfur: f64,
    pub zinc: f64,
    pub boron: f64,
    pub iron: f64,
    pub manganese: f64,
    pub copper: f64,
    pub last_updated: NaiveDate,
}
