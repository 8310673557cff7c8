//! Agronomy Configuration - every recommendation constant as a tunable TOML value
//!
//! Each struct implements `Default` with the canonical constants, so an
//! absent or empty config file reproduces the reference behaviour exactly.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::defaults::{CONFIG_ENV_VAR, CONFIG_FILE_NAME, DEFAULT_CROP, DEFAULT_PRICE_SOURCE, PRICE_CACHE_TTL_SECS};
use crate::types::{CropHealth, SoilType};

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for the recommendation engine and its collaborators.
///
/// Load with `AgronomyConfig::load()` which searches:
/// 1. `$SOILWISE_CONFIG`
/// 2. `./agronomy.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgronomyConfig {
    #[serde(default)]
    pub recommendation: RecommendationSettings,

    /// Base N/P/K requirement per crop (kg/ha), keyed by lowercase crop name.
    /// Rows in a file are merged over the built-in table.
    #[serde(default = "default_crops", deserialize_with = "merge_crops")]
    pub crops: BTreeMap<String, NutrientRequirement>,

    #[serde(default)]
    pub adjustments: AdjustmentConfig,

    #[serde(default)]
    pub products: ProductConfig,

    #[serde(default)]
    pub schedule: ScheduleConfig,

    #[serde(default)]
    pub advisories: AdvisoryThresholds,

    #[serde(default)]
    pub sustainability: SustainabilityConfig,

    #[serde(default)]
    pub estimates: EstimateConfig,

    #[serde(default)]
    pub pricing: PricingConfig,
}

impl Default for AgronomyConfig {
    fn default() -> Self {
        Self {
            recommendation: RecommendationSettings::default(),
            crops: default_crops(),
            adjustments: AdjustmentConfig::default(),
            products: ProductConfig::default(),
            schedule: ScheduleConfig::default(),
            advisories: AdvisoryThresholds::default(),
            sustainability: SustainabilityConfig::default(),
            estimates: EstimateConfig::default(),
            pricing: PricingConfig::default(),
        }
    }
}

impl AgronomyConfig {
    /// Load configuration using the standard search order:
    /// 1. `$SOILWISE_CONFIG` environment variable
    /// 2. `./agronomy.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), crops = config.crops.len(), "Loaded agronomy config from {}", CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(crops = config.crops.len(), "Loaded agronomy config from ./{}", CONFIG_FILE_NAME);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", CONFIG_FILE_NAME);
                }
            }
        }

        info!("No {} found, using built-in defaults", CONFIG_FILE_NAME);
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys are logged as warnings; they never fail the load.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in &super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::from("<inline>"), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Write config to a file, e.g. to seed an editable `agronomy.toml`.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Agronomy config saved");
        Ok(())
    }

    /// Base requirement row for a crop, if configured.
    pub fn crop(&self, name: &str) -> Option<&NutrientRequirement> {
        self.crops.get(&name.trim().to_lowercase())
    }

    /// Validate all values for internal consistency.
    ///
    /// Rules:
    /// - The default crop must have a row; every row must be finite and >= 0
    /// - Multipliers must be finite and > 0; the existing-nutrient floor in (0, 1]
    /// - Product nutrient fractions in (0, 1]
    /// - Nitrogen split shares must sum to 1.0
    /// - Score bands ordered and inside 0-100
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        if self.crops.is_empty() {
            errors.push("crops: at least one crop row is required".to_string());
        }
        let default_crop = self.recommendation.default_crop.trim().to_lowercase();
        if !self.crops.contains_key(&default_crop) {
            errors.push(format!(
                "recommendation.default_crop '{default_crop}' has no [crops.{default_crop}] row"
            ));
        }
        for (name, req) in &self.crops {
            for (nutrient, value) in [
                ("nitrogen", req.nitrogen),
                ("phosphorus", req.phosphorus),
                ("potassium", req.potassium),
            ] {
                if !value.is_finite() || value < 0.0 {
                    errors.push(format!("crops.{name}.{nutrient} = {value} must be finite and >= 0"));
                }
            }
        }

        let a = &self.adjustments;
        Self::check_factor(a.ph.acidic_factor, "adjustments.ph.acidic_factor", &mut errors);
        Self::check_factor(a.ph.alkaline_factor, "adjustments.ph.alkaline_factor", &mut errors);
        if a.ph.acidic_below > a.ph.alkaline_above {
            errors.push(format!(
                "adjustments.ph.acidic_below ({:.2}) must be <= alkaline_above ({:.2})",
                a.ph.acidic_below, a.ph.alkaline_above
            ));
        }
        for soil in SoilType::ALL {
            let f = a.soil_type.factors(soil);
            for (nutrient, value) in [("nitrogen", f.nitrogen), ("phosphorus", f.phosphorus), ("potassium", f.potassium)] {
                Self::check_factor(value, &format!("adjustments.soil_type.{soil}.{nutrient}"), &mut errors);
            }
        }
        let e = &a.existing_nutrients;
        for (name, cap) in [
            ("nitrogen_cap_ppm", e.nitrogen_cap_ppm),
            ("phosphorus_cap_ppm", e.phosphorus_cap_ppm),
            ("potassium_cap_ppm", e.potassium_cap_ppm),
        ] {
            if !cap.is_finite() || cap <= 0.0 {
                errors.push(format!("adjustments.existing_nutrients.{name} must be > 0 (used as divisor)"));
            }
        }
        if !(e.floor > 0.0 && e.floor <= 1.0) {
            errors.push(format!(
                "adjustments.existing_nutrients.floor = {} must be within (0, 1]",
                e.floor
            ));
        }
        Self::check_factor(a.rainfall.wet_factor, "adjustments.rainfall.wet_factor", &mut errors);
        Self::check_factor(a.rainfall.dry_factor, "adjustments.rainfall.dry_factor", &mut errors);
        Self::check_factor(a.temperature.hot_factor, "adjustments.temperature.hot_factor", &mut errors);
        for health in CropHealth::ALL {
            Self::check_factor(
                a.crop_health.factor(health),
                &format!("adjustments.crop_health.{health}"),
                &mut errors,
            );
        }

        let p = &self.products;
        for (name, fraction) in [
            ("urea_nitrogen_fraction", p.urea_nitrogen_fraction),
            ("dap_phosphorus_fraction", p.dap_phosphorus_fraction),
            ("mop_potassium_fraction", p.mop_potassium_fraction),
        ] {
            if !(fraction > 0.0 && fraction <= 1.0) {
                errors.push(format!("products.{name} = {fraction} must be within (0, 1] (used as divisor)"));
            }
        }

        let s = &self.schedule;
        let n_sum = s.planting_nitrogen_share + s.vegetative_nitrogen_share + s.reproductive_nitrogen_share;
        if (n_sum - 1.0).abs() > 0.01 {
            errors.push(format!("schedule nitrogen shares must sum to 1.0 (got {n_sum:.3})"));
        }
        if !(0.0..=1.0).contains(&s.reproductive_potassium_share) {
            errors.push("schedule.reproductive_potassium_share must be within [0, 1]".to_string());
        }
        if !(s.land_preparation_day < s.planting_day
            && s.planting_day < s.vegetative_day
            && s.vegetative_day < s.reproductive_day)
        {
            errors.push("schedule stage days must be strictly increasing".to_string());
        }

        let sc = &self.sustainability;
        if sc.good_band_min > sc.excellent_band_min {
            errors.push(format!(
                "sustainability.good_band_min ({}) must be <= excellent_band_min ({})",
                sc.good_band_min, sc.excellent_band_min
            ));
        }
        if sc.excellent_band_min > 100 {
            errors.push("sustainability.excellent_band_min must be <= 100".to_string());
        }

        if self.pricing.cache_ttl_secs == 0 {
            errors.push("pricing.cache_ttl_secs must be > 0".to_string());
        }

        let (range_errors, range_warnings) = super::validation::validate_agronomic_ranges(self);
        errors.extend(range_errors);
        for w in &range_warnings {
            warn!("{}", w);
        }

        if let Ok(value) = toml::Value::try_from(self) {
            for key in super::validation::non_finite_keys(&value, "") {
                errors.push(format!("{key} must be a finite number"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_factor(value: f64, name: &str, errors: &mut Vec<String>) {
        if !value.is_finite() || value <= 0.0 {
            errors.push(format!("{name} = {value} must be finite and > 0"));
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {1}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config parse error ({}): {1}", .0.display())]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config validation failed:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),
}

// ============================================================================
// Recommendation Settings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSettings {
    /// Row used for crop types missing from `[crops]`
    #[serde(default = "default_crop_name")]
    pub default_crop: String,
}

fn default_crop_name() -> String {
    DEFAULT_CROP.to_string()
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self { default_crop: default_crop_name() }
    }
}

// ============================================================================
// Crop Table
// ============================================================================

/// Base nutrient requirement (kg/ha) before any adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutrientRequirement {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
}

impl NutrientRequirement {
    pub const fn new(nitrogen: f64, phosphorus: f64, potassium: f64) -> Self {
        Self { nitrogen, phosphorus, potassium }
    }
}

/// Rice row, used when even the configured default crop is missing.
pub const RICE_REQUIREMENT: NutrientRequirement = NutrientRequirement::new(120.0, 60.0, 40.0);

fn default_crops() -> BTreeMap<String, NutrientRequirement> {
    BTreeMap::from([
        ("rice".to_string(), RICE_REQUIREMENT),
        ("wheat".to_string(), NutrientRequirement::new(150.0, 80.0, 60.0)),
        ("maize".to_string(), NutrientRequirement::new(180.0, 90.0, 70.0)),
        ("millets".to_string(), NutrientRequirement::new(60.0, 40.0, 30.0)),
    ])
}

fn merge_crops<'de, D>(deserializer: D) -> Result<BTreeMap<String, NutrientRequirement>, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = BTreeMap::<String, NutrientRequirement>::deserialize(deserializer)?;
    let mut crops = default_crops();
    for (name, req) in overrides {
        crops.insert(name.trim().to_lowercase(), req);
    }
    Ok(crops)
}

// ============================================================================
// Adjustment Factors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AdjustmentConfig {
    #[serde(default)]
    pub ph: PhAdjustment,
    #[serde(default)]
    pub soil_type: SoilTypeAdjustments,
    #[serde(default)]
    pub existing_nutrients: ExistingNutrientAdjustment,
    #[serde(default)]
    pub rainfall: RainfallAdjustment,
    #[serde(default)]
    pub temperature: TemperatureAdjustment,
    #[serde(default)]
    pub crop_health: CropHealthAdjustment,
}

/// Acidic soils get more of everything, alkaline soils less.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhAdjustment {
    pub acidic_below: f64,
    pub acidic_factor: f64,
    pub alkaline_above: f64,
    pub alkaline_factor: f64,
}

impl Default for PhAdjustment {
    fn default() -> Self {
        Self {
            acidic_below: 6.0,
            acidic_factor: 1.1,
            alkaline_above: 8.0,
            alkaline_factor: 0.9,
        }
    }
}

/// Per-nutrient multiplier triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutrientFactors {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
}

impl NutrientFactors {
    pub const NEUTRAL: Self = Self::new(1.0, 1.0, 1.0);

    pub const fn new(nitrogen: f64, phosphorus: f64, potassium: f64) -> Self {
        Self { nitrogen, phosphorus, potassium }
    }
}

/// Retention multipliers by soil texture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoilTypeAdjustments {
    pub sandy: NutrientFactors,
    pub loamy: NutrientFactors,
    pub clayey: NutrientFactors,
    pub silty: NutrientFactors,
}

impl SoilTypeAdjustments {
    pub fn factors(&self, soil_type: SoilType) -> NutrientFactors {
        match soil_type {
            SoilType::Sandy => self.sandy,
            SoilType::Loamy => self.loamy,
            SoilType::Clayey => self.clayey,
            SoilType::Silty => self.silty,
        }
    }
}

impl Default for SoilTypeAdjustments {
    fn default() -> Self {
        Self {
            sandy: NutrientFactors::new(1.2, 1.1, 1.3),
            loamy: NutrientFactors::NEUTRAL,
            clayey: NutrientFactors::new(0.9, 1.2, 0.8),
            silty: NutrientFactors::new(1.0, 1.0, 1.1),
        }
    }
}

/// Diminishing-returns factor `max(floor, 1 - level / cap)` per nutrient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExistingNutrientAdjustment {
    pub nitrogen_cap_ppm: f64,
    pub phosphorus_cap_ppm: f64,
    pub potassium_cap_ppm: f64,
    pub floor: f64,
}

impl Default for ExistingNutrientAdjustment {
    fn default() -> Self {
        Self {
            nitrogen_cap_ppm: 300.0,
            phosphorus_cap_ppm: 50.0,
            potassium_cap_ppm: 200.0,
            floor: 0.3,
        }
    }
}

/// Leaching risk. Applies to nitrogen only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RainfallAdjustment {
    pub threshold_mm: f64,
    pub wet_factor: f64,
    pub dry_factor: f64,
}

impl Default for RainfallAdjustment {
    fn default() -> Self {
        Self {
            threshold_mm: 5.0,
            wet_factor: 1.1,
            dry_factor: 0.95,
        }
    }
}

/// Volatilization loss. Applies to all three nutrients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemperatureAdjustment {
    pub threshold_c: f64,
    pub hot_factor: f64,
}

impl Default for TemperatureAdjustment {
    fn default() -> Self {
        Self {
            threshold_c: 30.0,
            hot_factor: 1.05,
        }
    }
}

/// Nitrogen multiplier by observed crop health.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropHealthAdjustment {
    pub poor: f64,
    pub fair: f64,
    pub good: f64,
    pub excellent: f64,
}

impl CropHealthAdjustment {
    pub fn factor(&self, health: CropHealth) -> f64 {
        match health {
            CropHealth::Poor => self.poor,
            CropHealth::Fair => self.fair,
            CropHealth::Good => self.good,
            CropHealth::Excellent => self.excellent,
        }
    }
}

impl Default for CropHealthAdjustment {
    fn default() -> Self {
        Self {
            poor: 1.3,
            fair: 1.15,
            good: 1.0,
            excellent: 0.9,
        }
    }
}

// ============================================================================
// Products & Schedule
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductConfig {
    /// Urea nitrogen content (46% N)
    pub urea_nitrogen_fraction: f64,
    /// DAP phosphate content (18-46-0)
    pub dap_phosphorus_fraction: f64,
    /// Muriate of potash K₂O content (60%)
    pub mop_potassium_fraction: f64,
    /// Organic carbon (%) below which compost is prescribed
    pub low_organic_carbon_pct: f64,
    pub compost_kg_per_ha: u32,
}

impl Default for ProductConfig {
    fn default() -> Self {
        Self {
            urea_nitrogen_fraction: 0.46,
            dap_phosphorus_fraction: 0.46,
            mop_potassium_fraction: 0.6,
            low_organic_carbon_pct: 1.0,
            compost_kg_per_ha: 2500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub land_preparation_day: i32,
    pub planting_day: i32,
    pub vegetative_day: i32,
    pub reproductive_day: i32,
    pub planting_nitrogen_share: f64,
    pub vegetative_nitrogen_share: f64,
    pub reproductive_nitrogen_share: f64,
    pub reproductive_potassium_share: f64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            land_preparation_day: -14,
            planting_day: 0,
            vegetative_day: 30,
            reproductive_day: 60,
            planting_nitrogen_share: 0.5,
            vegetative_nitrogen_share: 0.3,
            reproductive_nitrogen_share: 0.2,
            reproductive_potassium_share: 0.5,
        }
    }
}

// ============================================================================
// Weather Advisories
// ============================================================================

/// Strict-greater-than triggers for the weather advisory list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisoryThresholds {
    pub rainfall_mm: f64,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub wind_speed_kmh: f64,
}

impl Default for AdvisoryThresholds {
    fn default() -> Self {
        Self {
            rainfall_mm: 8.0,
            temperature_c: 32.0,
            humidity_pct: 80.0,
            wind_speed_kmh: 10.0,
        }
    }
}

// ============================================================================
// Sustainability Score & Estimates
// ============================================================================

/// Flat-bonus sustainability formula. Base 60 is the canonical choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SustainabilityConfig {
    pub base_score: i32,
    pub high_organic_carbon_pct: f64,
    pub high_organic_bonus: i32,
    pub moderate_organic_carbon_pct: f64,
    pub moderate_organic_bonus: i32,
    pub precision_testing_bonus: i32,
    pub weather_responsive_bonus: i32,
    pub nutrient_load_limit_kg: u32,
    pub nutrient_load_penalty: i32,
    pub excellent_health_bonus: i32,
    pub excellent_band_min: u32,
    pub good_band_min: u32,
}

impl Default for SustainabilityConfig {
    fn default() -> Self {
        Self {
            base_score: 60,
            high_organic_carbon_pct: 1.5,
            high_organic_bonus: 15,
            moderate_organic_carbon_pct: 1.0,
            moderate_organic_bonus: 10,
            precision_testing_bonus: 10,
            weather_responsive_bonus: 10,
            nutrient_load_limit_kg: 300,
            nutrient_load_penalty: 10,
            excellent_health_bonus: 5,
            excellent_band_min: 80,
            good_band_min: 60,
        }
    }
}

/// Linear yield and cost estimate coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimateConfig {
    pub yield_base_pct: f64,
    pub yield_pivot_score: f64,
    pub yield_slope: f64,
    pub cost_per_kg_nitrogen: f64,
    pub cost_per_kg_phosphorus: f64,
    pub cost_per_kg_potassium: f64,
    pub organic_amendment_cost: f64,
}

impl Default for EstimateConfig {
    fn default() -> Self {
        Self {
            yield_base_pct: 5.0,
            yield_pivot_score: 50.0,
            yield_slope: 0.4,
            cost_per_kg_nitrogen: 0.8,
            cost_per_kg_phosphorus: 1.2,
            cost_per_kg_potassium: 0.6,
            organic_amendment_cost: 50.0,
        }
    }
}

// ============================================================================
// Market Pricing
// ============================================================================

/// Built-in market price sheet and its cache lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub nitrogen_per_kg: f64,
    pub phosphorus_per_kg: f64,
    pub potassium_per_kg: f64,
    pub organic_per_ha: f64,
    pub source: String,
    pub cache_ttl_secs: u64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            nitrogen_per_kg: 80.0,
            phosphorus_per_kg: 140.0,
            potassium_per_kg: 62.0,
            organic_per_ha: 500.0,
            source: DEFAULT_PRICE_SOURCE.to_string(),
            cache_ttl_secs: PRICE_CACHE_TTL_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = AgronomyConfig::default();
        assert!(config.validate().is_ok(), "Default config must always validate");
    }

    #[test]
    fn test_empty_toml_produces_defaults() {
        let config: AgronomyConfig = toml::from_str("").expect("empty TOML should parse");
        assert_eq!(config, AgronomyConfig::default());
        assert_eq!(config.crops.len(), 4);
        assert_eq!(config.sustainability.base_score, 60);
        assert_eq!(config.adjustments.existing_nutrients.floor, 0.3);
    }

    #[test]
    fn test_partial_toml_override() {
        let toml_str = r#"
[adjustments.rainfall]
dry_factor = 1.0

[sustainability]
base_score = 30
"#;
        let config: AgronomyConfig = toml::from_str(toml_str).expect("partial TOML should parse");
        assert_eq!(config.adjustments.rainfall.dry_factor, 1.0);
        assert_eq!(config.sustainability.base_score, 30);
        // Non-overridden values retain defaults
        assert_eq!(config.adjustments.rainfall.wet_factor, 1.1);
        assert_eq!(config.adjustments.rainfall.threshold_mm, 5.0);
        assert_eq!(config.sustainability.precision_testing_bonus, 10);
    }

    #[test]
    fn test_crop_rows_merge_over_defaults() {
        let toml_str = r#"
[crops.Barley]
nitrogen = 90.0
phosphorus = 45.0
potassium = 30.0

[crops.wheat]
nitrogen = 140.0
phosphorus = 80.0
potassium = 60.0
"#;
        let config: AgronomyConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.crops.len(), 5);
        assert_eq!(config.crop("barley"), Some(&NutrientRequirement::new(90.0, 45.0, 30.0)));
        assert_eq!(config.crop(" WHEAT ").map(|r| r.nitrogen), Some(140.0));
        assert_eq!(config.crop("rice"), Some(&RICE_REQUIREMENT));
    }

    #[test]
    fn test_validation_catches_missing_default_crop() {
        let mut config = AgronomyConfig::default();
        config.recommendation.default_crop = "sorghum".to_string();
        match config.validate() {
            Err(ConfigError::Validation(errors)) => {
                assert!(errors.iter().any(|e| e.contains("sorghum")));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_catches_bad_floor_and_fraction() {
        let mut config = AgronomyConfig::default();
        config.adjustments.existing_nutrients.floor = 0.0;
        config.products.mop_potassium_fraction = 0.0;
        let Err(ConfigError::Validation(errors)) = config.validate() else {
            panic!("zero floor and zero fraction must fail");
        };
        assert!(errors.iter().any(|e| e.contains("floor")));
        assert!(errors.iter().any(|e| e.contains("mop_potassium_fraction")));
    }

    #[test]
    fn test_validation_catches_bad_nitrogen_split() {
        let mut config = AgronomyConfig::default();
        config.schedule.vegetative_nitrogen_share = 0.6;
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Validation(ref e)) if e.iter().any(|m| m.contains("sum to 1.0"))));
    }

    #[test]
    fn test_validation_catches_inverted_bands() {
        let mut config = AgronomyConfig::default();
        config.sustainability.good_band_min = 90;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_catches_nan_factor() {
        let mut config = AgronomyConfig::default();
        config.adjustments.temperature.hot_factor = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_roundtrip_preserves_config() {
        let config = AgronomyConfig::default();
        let text = config.to_toml().unwrap();
        let parsed = AgronomyConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_parse_error_is_reported() {
        let result = AgronomyConfig::from_toml_str("[sustainability]\nbase_score = \"high\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_, _))));
    }
}
