//! Collaborators that supply engine inputs
//!
//! - `weather` - weather snapshots (static or seeded mock)
//! - `openweather` - live OpenWeatherMap snapshots with a per-location cache
//! - `soil` - regional soil health cards looked up by region or coordinates
//! - `crop` - crop health derivation from deficiencies, mock analyzer
//! - `prices` - fertilizer price sheet with TTL cache and fallbacks
//!
//! Randomness lives here only, always behind a seedable `StdRng`.

pub mod crop;
pub mod openweather;
pub mod prices;
pub mod soil;
pub mod weather;

pub use crop::{assess, care_recommendations, derive_crop_health, CropAnalyzer, MockCropAnalyzer};
pub use openweather::OpenWeatherProvider;
pub use prices::{CachedPriceProvider, PriceSource, StaticPriceSource};
pub use soil::{region_for_coordinates, validate_card_number, RegionalSoilCards, SoilCardProvider};
pub use weather::{MockWeatherProvider, StaticWeatherProvider, WeatherProvider};

use thiserror::Error;

/// Errors surfaced by collaborators, never by the engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("Unknown region: {0}")]
    UnknownRegion(String),

    #[error("Invalid coordinates: lat {lat}, lon {lon}")]
    InvalidCoordinates { lat: f64, lon: f64 },

    #[error("Invalid soil health card number: {0}")]
    InvalidCardNumber(String),

    #[error("{source_name} unavailable: {reason}")]
    Unavailable { source_name: String, reason: String },
}
