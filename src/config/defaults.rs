//! System-wide default constants.
//!
//! Agronomic numbers live in the `Default` impls of `AgronomyConfig`;
//! this file holds the plumbing constants around them.

// ============================================================================
// Config Loading
// ============================================================================

/// Environment variable naming an agronomy TOML file.
pub const CONFIG_ENV_VAR: &str = "SOILWISE_CONFIG";

/// Config file looked up in the current working directory.
pub const CONFIG_FILE_NAME: &str = "agronomy.toml";

/// Crop whose base requirements are used for unknown crop types.
pub const DEFAULT_CROP: &str = "rice";

// ============================================================================
// Prices
// ============================================================================

/// How long a fetched price sheet is served from cache (seconds).
pub const PRICE_CACHE_TTL_SECS: u64 = 3_600;

/// Source tag of the built-in price sheet.
pub const DEFAULT_PRICE_SOURCE: &str = "indian-market-rates-2025";

/// Source tag used when no sheet could be fetched and nothing is cached.
pub const FALLBACK_PRICE_SOURCE: &str = "default-fallback";

// ============================================================================
// Weather
// ============================================================================

/// Environment variable holding the OpenWeatherMap API key.
pub const OPENWEATHER_API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

pub const OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// How long a live weather snapshot is served from cache per location (seconds).
pub const WEATHER_CACHE_TTL_SECS: u64 = 3_600;

pub const WEATHER_HTTP_TIMEOUT_SECS: u64 = 30;

/// Location used for live weather when a request has no coordinates (New Delhi).
pub const DEFAULT_WEATHER_LAT: f64 = 28.6139;
pub const DEFAULT_WEATHER_LON: f64 = 77.2090;

// ============================================================================
// Soil Cards
// ============================================================================

/// Region used when coordinates fall outside every known regional box.
pub const FALLBACK_REGION: &str = "north_plains";

// ============================================================================
// Validation
// ============================================================================

/// Base requirement above which a crop row is flagged as suspicious (kg/ha).
pub const MAX_TYPICAL_BASE_KG_HA: f64 = 400.0;

/// Adjustment factor above which a multiplier is flagged as suspicious.
pub const MAX_TYPICAL_FACTOR: f64 = 2.0;

/// Maximum edit distance for "did you mean" key suggestions.
pub const MAX_SUGGESTION_DISTANCE: usize = 3;
