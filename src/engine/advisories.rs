//! Stage E: weather advisories for application timing

use crate::config::AgronomyConfig;
use crate::types::WeatherSnapshot;

pub const HIGH_RAINFALL_ADVISORY: &str =
    "High rainfall expected - consider split applications to reduce nutrient loss";
pub const HIGH_TEMPERATURE_ADVISORY: &str =
    "High temperature - apply fertilizers early morning or late evening";
pub const HIGH_HUMIDITY_ADVISORY: &str =
    "High humidity - ensure good ventilation for foliar applications";
pub const HIGH_WIND_ADVISORY: &str = "High wind speed - avoid foliar applications";

/// Advisories in fixed order: rainfall, temperature, humidity, wind.
pub fn weather_considerations(config: &AgronomyConfig, weather: &WeatherSnapshot) -> Vec<String> {
    let t = &config.advisories;
    [
        (weather.rainfall > t.rainfall_mm, HIGH_RAINFALL_ADVISORY),
        (weather.temperature > t.temperature_c, HIGH_TEMPERATURE_ADVISORY),
        (weather.humidity > t.humidity_pct, HIGH_HUMIDITY_ADVISORY),
        (weather.wind_speed > t.wind_speed_kmh, HIGH_WIND_ADVISORY),
    ]
    .into_iter()
    .filter(|(triggered, _)| *triggered)
    .map(|(_, advisory)| advisory.to_string())
    .collect()
}
