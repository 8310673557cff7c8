//! Recommendation Engine
//!
//! Deterministic fertilizer recommendation. Pure calculation, no I/O, no
//! randomness: identical inputs always produce identical output.
//!
//! ## Stages
//! - A `requirements` - base N/P/K per crop
//! - B `adjustments` - pH, soil type, existing nutrients, rainfall, temperature, crop health
//! - C `products` - urea / DAP / MOP quantities, compost on low-carbon soils
//! - D `schedule` - four-stage split application
//! - E `advisories` - weather warnings
//! - F, G `scoring` - sustainability score, yield and cost estimates
//!
//! `quick_prediction` is a lighter single-product rule set fed by the soil
//! test alone. `pricing` prices a finished dosage against a market sheet; it is used by
//! front ends, never by `compute`.

pub mod adjustments;
pub mod advisories;
pub mod pricing;
pub mod products;
pub mod quick_prediction;
pub mod requirements;
pub mod schedule;
pub mod scoring;

pub use adjustments::AdjustmentFactors;
pub use pricing::market_cost;
pub use quick_prediction::{quick_report, QuickPredictionInput, QuickPredictionReport};
pub use scoring::round_half_up;

use tracing::debug;

use crate::config::{self, AgronomyConfig};
use crate::types::{
    CropHealthAssessment, RecommendationResult, SoilSample, SustainabilityBand, WeatherSnapshot,
};

/// Fertilizer recommendation calculator.
///
/// Holds only its configuration. Cheap to clone and safe to share between
/// threads; concurrent calls need no coordination.
#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    config: AgronomyConfig,
}

impl RecommendationEngine {
    pub fn new(config: AgronomyConfig) -> Self {
        Self { config }
    }

    /// Engine using the process-wide configuration (`config::get()`).
    pub fn from_global() -> Self {
        Self::new(config::get().clone())
    }

    pub fn config(&self) -> &AgronomyConfig {
        &self.config
    }

    /// Compute a full recommendation.
    ///
    /// # Pipeline
    ///
    /// 1. Base N/P/K for the crop (unknown crops use the default crop row)
    /// 2. Multiply by pH, soil type, existing nutrient, rainfall (N only),
    ///    temperature and crop health (N only) factors, then round
    /// 3. Product quantities, split schedule and weather advisories
    /// 4. Sustainability score, yield increase and cost estimate
    ///
    /// Total over every input: out-of-range values degrade to clamped or
    /// zero outputs instead of failing. Callers validate beforehand.
    ///
    /// # Arguments
    ///
    /// * `crop_type` - Crop name, matched case-insensitively against `[crops]`
    /// * `soil` - Soil texture, pH, existing N/P/K (ppm) and organic carbon (%)
    /// * `weather` - Current temperature, humidity, rainfall and wind
    /// * `crop_health` - Optional image assessment; only `crop_health` is read
    ///
    /// # Returns
    ///
    /// `RecommendationResult` with dosage in kg/ha, products, a four-stage
    /// schedule, advisories, score (0-100), yield increase (%) and cost.
    pub fn compute(
        &self,
        crop_type: &str,
        soil: &SoilSample,
        weather: &WeatherSnapshot,
        crop_health: Option<&CropHealthAssessment>,
    ) -> RecommendationResult {
        let cfg = &self.config;

        // Stage A
        let base = requirements::base_requirement(cfg, crop_type);
        if !requirements::is_known_crop(cfg, crop_type) {
            debug!(
                crop = crop_type,
                fallback = %cfg.recommendation.default_crop,
                "Unknown crop type, using default crop requirements"
            );
        }

        // Stage B
        let factors = AdjustmentFactors::resolve(cfg, soil, weather, crop_health);
        debug!(
            ph = factors.ph,
            soil_n = factors.soil_type.nitrogen,
            soil_p = factors.soil_type.phosphorus,
            soil_k = factors.soil_type.potassium,
            existing_n = factors.existing.nitrogen,
            existing_p = factors.existing.phosphorus,
            existing_k = factors.existing.potassium,
            rainfall = factors.rainfall,
            temperature = factors.temperature,
            crop_health = factors.crop_health,
            "Adjustment factors resolved"
        );
        let fertilizer = factors.apply(&base);

        // Stages C-E
        let organic_needed = products::needs_organic_amendment(cfg, soil.organic_carbon);
        let products = products::derive_products(cfg, &fertilizer, organic_needed);
        let application_schedule = schedule::build_schedule(cfg, &fertilizer, organic_needed);
        let weather_considerations = advisories::weather_considerations(cfg, weather);

        // Stages F-G
        let sustainability_score = scoring::sustainability_score(cfg, soil, &fertilizer, crop_health);
        let expected_yield_increase = scoring::expected_yield_increase(cfg, sustainability_score);
        let cost_estimate = scoring::cost_estimate(cfg, &fertilizer, organic_needed);

        debug!(
            crop = crop_type,
            n = fertilizer.nitrogen,
            p = fertilizer.phosphorus,
            k = fertilizer.potassium,
            score = sustainability_score,
            advisories = weather_considerations.len(),
            "Recommendation computed"
        );

        RecommendationResult {
            fertilizer,
            products,
            application_schedule,
            weather_considerations,
            sustainability_score,
            expected_yield_increase,
            cost_estimate,
        }
    }

    /// The factors `compute` would apply for these inputs.
    pub fn adjustment_factors(
        &self,
        soil: &SoilSample,
        weather: &WeatherSnapshot,
        crop_health: Option<&CropHealthAssessment>,
    ) -> AdjustmentFactors {
        AdjustmentFactors::resolve(&self.config, soil, weather, crop_health)
    }

    pub fn sustainability_band(&self, score: u32) -> SustainabilityBand {
        scoring::sustainability_band(&self.config, score)
    }

    /// Whether a soil sample triggers the compost amendment.
    pub fn needs_organic_amendment(&self, soil: &SoilSample) -> bool {
        products::needs_organic_amendment(&self.config, soil.organic_carbon)
    }
}
