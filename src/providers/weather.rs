//! Weather providers
//!
//! `StaticWeatherProvider` always returns the same snapshot.
//! `MockWeatherProvider` draws plausible values from a seeded RNG.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use tracing::debug;

use super::ProviderError;
use crate::types::{Coordinates, WeatherSnapshot};

/// Source of current weather for a location.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Current weather, at `coordinates` when given.
    async fn current(&self, coordinates: Option<Coordinates>) -> Result<WeatherSnapshot, ProviderError>;

    /// Human-readable name for logging.
    fn provider_name(&self) -> &str;
}

// ============================================================================
// Static Provider
// ============================================================================

/// Returns one fixed snapshot regardless of location.
#[derive(Debug, Clone, Default)]
pub struct StaticWeatherProvider {
    snapshot: WeatherSnapshot,
}

impl StaticWeatherProvider {
    pub fn new(snapshot: WeatherSnapshot) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl WeatherProvider for StaticWeatherProvider {
    async fn current(&self, _coordinates: Option<Coordinates>) -> Result<WeatherSnapshot, ProviderError> {
        Ok(self.snapshot.clone())
    }

    fn provider_name(&self) -> &str {
        "static"
    }
}

// ============================================================================
// Mock Provider
// ============================================================================

const DESCRIPTIONS: [&str; 4] = ["Sunny", "Partly Cloudy", "Cloudy", "Light Rain"];

/// Random but plausible weather: 20-35 °C, 40-80 % humidity, 0-10 mm rain,
/// 0-15 km/h wind.
pub struct MockWeatherProvider {
    rng: Mutex<StdRng>,
}

impl MockWeatherProvider {
    /// Reproducible sequence for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self { rng: Mutex::new(StdRng::seed_from_u64(seed)) }
    }

    pub fn from_entropy() -> Self {
        Self { rng: Mutex::new(StdRng::from_entropy()) }
    }

    fn draw(&self, location: String) -> WeatherSnapshot {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        WeatherSnapshot {
            temperature: round1(rng.gen_range(20.0..35.0)),
            humidity: round1(rng.gen_range(40.0..80.0)),
            rainfall: round1(rng.gen_range(0.0..10.0)),
            wind_speed: round1(rng.gen_range(0.0..15.0)),
            description: DESCRIPTIONS[rng.gen_range(0..DESCRIPTIONS.len())].to_string(),
            location,
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[async_trait]
impl WeatherProvider for MockWeatherProvider {
    async fn current(&self, coordinates: Option<Coordinates>) -> Result<WeatherSnapshot, ProviderError> {
        let location = match coordinates {
            Some(c) if !c.is_valid() => {
                return Err(ProviderError::InvalidCoordinates { lat: c.lat, lon: c.lon });
            }
            Some(_) => "Your Location".to_string(),
            None => "Default Location".to_string(),
        };
        let snapshot = self.draw(location);
        debug!(
            temperature = snapshot.temperature,
            rainfall = snapshot.rainfall,
            "Mock weather generated"
        );
        Ok(snapshot)
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}
