//! OpenWeatherMap provider
//!
//! Live weather from the OpenWeatherMap `weather` and `forecast` endpoints.
//! Snapshots are cached per location (coordinates rounded to 4 decimals)
//! for an hour. A failed fetch serves the stale entry when one exists.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::weather::WeatherProvider;
use super::ProviderError;
use crate::config::defaults::{
    DEFAULT_WEATHER_LAT, DEFAULT_WEATHER_LON, OPENWEATHER_API_KEY_ENV, OPENWEATHER_BASE_URL,
    WEATHER_CACHE_TTL_SECS, WEATHER_HTTP_TIMEOUT_SECS,
};
use crate::engine::round_half_up;
use crate::types::{Coordinates, WeatherSnapshot};

const SOURCE_NAME: &str = "openweathermap";

/// m/s → km/h
const MS_TO_KMH: f64 = 3.6;

#[derive(Debug, thiserror::Error)]
enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server returned status {0}")]
    Status(reqwest::StatusCode),
}

impl From<FetchError> for ProviderError {
    fn from(e: FetchError) -> Self {
        ProviderError::Unavailable {
            source_name: SOURCE_NAME.to_string(),
            reason: e.to_string(),
        }
    }
}

// ============================================================================
// Response Bodies
// ============================================================================

/// `GET /weather` body, only the fields the snapshot needs.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentWeather {
    pub main: MainReadings,
    #[serde(default)]
    pub wind: Option<Wind>,
    #[serde(default)]
    pub weather: Vec<Condition>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sys: Option<Sys>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    pub humidity: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Wind {
    #[serde(default)]
    pub speed: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Condition {
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sys {
    #[serde(default)]
    pub country: String,
}

/// `GET /forecast` body.
#[derive(Debug, Clone, Deserialize)]
pub struct Forecast {
    #[serde(default)]
    pub list: Vec<ForecastEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastEntry {
    #[serde(default)]
    pub rain: Option<Rain>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Rain {
    #[serde(rename = "3h", default)]
    pub three_hour: f64,
}

/// Build a snapshot from the two response bodies.
///
/// Temperature and wind (converted to km/h) are rounded to whole numbers.
/// Rainfall is the first forecast slot's 3-hour total, 0 when the forecast
/// is missing or dry.
pub fn snapshot_from_responses(current: &CurrentWeather, forecast: Option<&Forecast>) -> WeatherSnapshot {
    let rainfall = forecast
        .and_then(|f| f.list.first())
        .and_then(|entry| entry.rain.as_ref())
        .map_or(0.0, |rain| rain.three_hour);
    let wind_speed = current.wind.as_ref().map_or(0.0, |w| w.speed * MS_TO_KMH);
    let location = match current.sys.as_ref().map(|s| s.country.as_str()) {
        Some(country) if !country.is_empty() => format!("{}, {}", current.name, country),
        _ => current.name.clone(),
    };

    WeatherSnapshot {
        temperature: round_half_up(current.main.temp),
        humidity: current.main.humidity,
        rainfall,
        wind_speed: round_half_up(wind_speed),
        description: current
            .weather
            .first()
            .map(|c| c.description.clone())
            .unwrap_or_default(),
        location,
    }
}

// ============================================================================
// Provider
// ============================================================================

/// Cache key: coordinates rounded to 4 decimal places.
pub type LocationKey = (i64, i64);

/// Rounds to the 4-decimal grid used as the cache key.
pub fn location_key(at: Coordinates) -> LocationKey {
    ((at.lat * 1e4).round() as i64, (at.lon * 1e4).round() as i64)
}

struct CachedSnapshot {
    snapshot: WeatherSnapshot,
    fetched_at: Instant,
}

pub struct OpenWeatherProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    ttl: Duration,
    default_location: Coordinates,
    cache: RwLock<HashMap<LocationKey, CachedSnapshot>>,
}

impl OpenWeatherProvider {
    pub fn new(api_key: &str) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(WEATHER_HTTP_TIMEOUT_SECS))
            .build()
            .map_err(FetchError::from)?;

        Ok(Self {
            http,
            base_url: OPENWEATHER_BASE_URL.to_string(),
            api_key: api_key.to_string(),
            ttl: Duration::from_secs(WEATHER_CACHE_TTL_SECS),
            default_location: Coordinates::new(DEFAULT_WEATHER_LAT, DEFAULT_WEATHER_LON),
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// Key from `OPENWEATHER_API_KEY`.
    pub fn from_env() -> Result<Self, ProviderError> {
        match std::env::var(OPENWEATHER_API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => Self::new(key.trim()),
            _ => Err(ProviderError::Unavailable {
                source_name: SOURCE_NAME.to_string(),
                reason: format!("{OPENWEATHER_API_KEY_ENV} is not set"),
            }),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Location used when a request has no coordinates.
    pub fn with_default_location(mut self, at: Coordinates) -> Self {
        self.default_location = at;
        self
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str, at: Coordinates) -> Result<T, FetchError> {
        let resp = self
            .http
            .get(format!("{}/{}", self.base_url, endpoint))
            .query(&[
                ("lat", at.lat.to_string()),
                ("lon", at.lon.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await?;

        match resp.status() {
            status if status.is_success() => Ok(resp.json::<T>().await?),
            status => Err(FetchError::Status(status)),
        }
    }

    async fn fetch(&self, at: Coordinates) -> Result<WeatherSnapshot, FetchError> {
        let current: CurrentWeather = self.get("weather", at).await?;
        let forecast = match self.get::<Forecast>("forecast", at).await {
            Ok(forecast) => Some(forecast),
            Err(e) => {
                warn!(error = %e, "Forecast fetch failed, assuming no rainfall");
                None
            }
        };
        Ok(snapshot_from_responses(&current, forecast.as_ref()))
    }

    /// Drop every cached snapshot.
    pub async fn invalidate(&self) {
        self.cache.write().await.clear();
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, coordinates: Option<Coordinates>) -> Result<WeatherSnapshot, ProviderError> {
        let at = coordinates.unwrap_or(self.default_location);
        if !at.is_valid() {
            return Err(ProviderError::InvalidCoordinates { lat: at.lat, lon: at.lon });
        }
        let key = location_key(at);

        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.get(&key) {
                if cached.fetched_at.elapsed() < self.ttl {
                    debug!(location = %cached.snapshot.location, "Weather served from cache");
                    return Ok(cached.snapshot.clone());
                }
            }
        }

        match self.fetch(at).await {
            Ok(snapshot) => {
                info!(
                    location = %snapshot.location,
                    temperature = snapshot.temperature,
                    rainfall = snapshot.rainfall,
                    "Weather refreshed"
                );
                self.cache.write().await.insert(
                    key,
                    CachedSnapshot {
                        snapshot: snapshot.clone(),
                        fetched_at: Instant::now(),
                    },
                );
                Ok(snapshot)
            }
            Err(e) => {
                let cache = self.cache.read().await;
                if let Some(cached) = cache.get(&key) {
                    warn!(error = %e, "Weather fetch failed, serving stale snapshot");
                    Ok(cached.snapshot.clone())
                } else {
                    Err(e.into())
                }
            }
        }
    }

    fn provider_name(&self) -> &str {
        SOURCE_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURRENT_BODY: &str = r#"{
        "coord": {"lon": 77.209, "lat": 28.6139},
        "weather": [{"id": 721, "main": "Haze", "description": "haze", "icon": "50d"}],
        "main": {"temp": 31.52, "feels_like": 33.1, "pressure": 1008, "humidity": 58},
        "wind": {"speed": 2.57, "deg": 290},
        "name": "New Delhi",
        "sys": {"country": "IN", "sunrise": 1700000000}
    }"#;

    const FORECAST_BODY: &str = r#"{
        "cnt": 2,
        "list": [
            {"dt": 1700010800, "main": {"temp": 30.1}, "rain": {"3h": 1.75}},
            {"dt": 1700021600, "main": {"temp": 28.4}}
        ]
    }"#;

    fn unreachable_provider() -> OpenWeatherProvider {
        OpenWeatherProvider::new("test-key")
            .unwrap()
            .with_base_url("http://127.0.0.1:1/data/2.5/")
    }

    fn cached(snapshot: WeatherSnapshot) -> CachedSnapshot {
        CachedSnapshot { snapshot, fetched_at: Instant::now() }
    }

    #[test]
    fn test_snapshot_mapping() {
        let current: CurrentWeather = serde_json::from_str(CURRENT_BODY).unwrap();
        let forecast: Forecast = serde_json::from_str(FORECAST_BODY).unwrap();
        let w = snapshot_from_responses(&current, Some(&forecast));

        assert_eq!(w.temperature, 32.0);
        assert_eq!(w.humidity, 58.0);
        assert_eq!(w.rainfall, 1.75);
        // 2.57 m/s = 9.252 km/h
        assert_eq!(w.wind_speed, 9.0);
        assert_eq!(w.description, "haze");
        assert_eq!(w.location, "New Delhi, IN");
        assert!(w.validate().is_ok());
    }

    #[test]
    fn test_missing_rain_means_zero() {
        let current: CurrentWeather = serde_json::from_str(CURRENT_BODY).unwrap();
        assert_eq!(snapshot_from_responses(&current, None).rainfall, 0.0);

        let dry: Forecast = serde_json::from_str(r#"{"list": [{"dt": 1}]}"#).unwrap();
        assert_eq!(snapshot_from_responses(&current, Some(&dry)).rainfall, 0.0);

        let empty: Forecast = serde_json::from_str(r#"{"list": []}"#).unwrap();
        assert_eq!(snapshot_from_responses(&current, Some(&empty)).rainfall, 0.0);
    }

    #[test]
    fn test_sparse_current_body() {
        let current: CurrentWeather =
            serde_json::from_str(r#"{"main": {"temp": -2.5, "humidity": 90}, "name": "Leh"}"#).unwrap();
        let w = snapshot_from_responses(&current, None);
        // halves round toward +inf
        assert_eq!(w.temperature, -2.0);
        assert_eq!(w.wind_speed, 0.0);
        assert_eq!(w.description, "");
        assert_eq!(w.location, "Leh");
    }

    #[test]
    fn test_location_key_rounds_to_four_decimals() {
        assert_eq!(
            location_key(Coordinates::new(28.613_94, 77.209_01)),
            location_key(Coordinates::new(28.6139, 77.2090))
        );
        assert_ne!(
            location_key(Coordinates::new(28.6139, 77.2090)),
            location_key(Coordinates::new(28.6140, 77.2090))
        );
    }

    #[test]
    fn test_from_env_requires_key() {
        if std::env::var(OPENWEATHER_API_KEY_ENV).is_err() {
            let err = OpenWeatherProvider::from_env().err().unwrap();
            assert!(err.to_string().contains(OPENWEATHER_API_KEY_ENV));
        }
    }

    #[tokio::test]
    async fn test_unreachable_api_is_unavailable() {
        let provider = unreachable_provider();
        let err = provider.current(Some(Coordinates::new(12.97, 77.59))).await.unwrap_err();
        assert!(
            matches!(err, ProviderError::Unavailable { ref source_name, .. } if source_name == "openweathermap"),
            "{err}"
        );
    }

    #[tokio::test]
    async fn test_invalid_coordinates_rejected_before_fetch() {
        let provider = unreachable_provider();
        let err = provider.current(Some(Coordinates::new(0.0, 181.0))).await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidCoordinates { .. }));
    }

    #[tokio::test]
    async fn test_fresh_cache_entry_skips_fetch() {
        let provider = unreachable_provider();
        let snapshot = WeatherSnapshot { location: "Cached, IN".to_string(), ..WeatherSnapshot::default() };
        let at = Coordinates::new(DEFAULT_WEATHER_LAT, DEFAULT_WEATHER_LON);
        provider.cache.write().await.insert(location_key(at), cached(snapshot.clone()));

        // no coordinates falls back to the default location
        assert_eq!(provider.current(None).await.unwrap(), snapshot);
    }

    #[tokio::test]
    async fn test_stale_entry_served_when_fetch_fails() {
        let provider = unreachable_provider().with_ttl(Duration::ZERO);
        let at = Coordinates::new(19.076, 72.8777);
        let snapshot = WeatherSnapshot { rainfall: 4.0, ..WeatherSnapshot::default() };
        provider.cache.write().await.insert(location_key(at), cached(snapshot.clone()));

        assert_eq!(provider.current(Some(at)).await.unwrap(), snapshot);

        provider.invalidate().await;
        assert!(provider.current(Some(at)).await.is_err());
    }
}
