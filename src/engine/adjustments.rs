//! Stage B: multiplicative adjustment chain
//!
//! Factor order (kept fixed so floating-point results are reproducible):
//! pH → soil type → existing nutrient → rainfall (N) → temperature → crop health (N)

use serde::Serialize;

use super::scoring::round_to_u32;
use crate::config::{AgronomyConfig, NutrientFactors, NutrientRequirement};
use crate::types::{CropHealthAssessment, NutrientDosage, SoilSample, WeatherSnapshot};

/// Every factor resolved for one computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentFactors {
    pub ph: f64,
    pub soil_type: NutrientFactors,
    pub existing: NutrientFactors,
    /// Nitrogen only
    pub rainfall: f64,
    pub temperature: f64,
    /// Nitrogen only
    pub crop_health: f64,
}

impl AdjustmentFactors {
    /// Resolve all factors from the inputs.
    pub fn resolve(
        config: &AgronomyConfig,
        soil: &SoilSample,
        weather: &WeatherSnapshot,
        crop_health: Option<&CropHealthAssessment>,
    ) -> Self {
        let adj = &config.adjustments;
        Self {
            ph: ph_factor(config, soil.ph),
            soil_type: adj.soil_type.factors(soil.soil_type),
            existing: existing_nutrient_factors(config, soil),
            rainfall: if weather.rainfall > adj.rainfall.threshold_mm {
                adj.rainfall.wet_factor
            } else {
                adj.rainfall.dry_factor
            },
            temperature: if weather.temperature > adj.temperature.threshold_c {
                adj.temperature.hot_factor
            } else {
                1.0
            },
            crop_health: crop_health.map_or(1.0, |c| adj.crop_health.factor(c.crop_health)),
        }
    }

    /// Scale a base requirement into the final rounded dosage.
    pub fn apply(&self, base: &NutrientRequirement) -> NutrientDosage {
        let nitrogen = base.nitrogen
            * self.ph
            * self.soil_type.nitrogen
            * self.existing.nitrogen
            * self.rainfall
            * self.temperature
            * self.crop_health;
        let phosphorus =
            base.phosphorus * self.ph * self.soil_type.phosphorus * self.existing.phosphorus * self.temperature;
        let potassium =
            base.potassium * self.ph * self.soil_type.potassium * self.existing.potassium * self.temperature;

        NutrientDosage {
            nitrogen: round_to_u32(nitrogen),
            phosphorus: round_to_u32(phosphorus),
            potassium: round_to_u32(potassium),
        }
    }
}

/// Acidic soils need more, alkaline soils less. Boundaries are neutral.
pub fn ph_factor(config: &AgronomyConfig, ph: f64) -> f64 {
    let p = &config.adjustments.ph;
    if ph < p.acidic_below {
        p.acidic_factor
    } else if ph > p.alkaline_above {
        p.alkaline_factor
    } else {
        1.0
    }
}

/// Diminishing returns: `max(floor, 1 - level / cap)` per nutrient.
pub fn existing_nutrient_factors(config: &AgronomyConfig, soil: &SoilSample) -> NutrientFactors {
    let e = &config.adjustments.existing_nutrients;
    let factor = |level: f64, cap: f64| (1.0 - level / cap).max(e.floor);
    NutrientFactors::new(
        factor(soil.nitrogen, e.nitrogen_cap_ppm),
        factor(soil.phosphorus, e.phosphorus_cap_ppm),
        factor(soil.potassium, e.potassium_cap_ppm),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CropHealth, SoilType};

    fn weather(temperature: f64, rainfall: f64) -> WeatherSnapshot {
        WeatherSnapshot { temperature, rainfall, ..WeatherSnapshot::default() }
    }

    #[test]
    fn test_ph_factor_boundaries() {
        let config = AgronomyConfig::default();
        assert_eq!(ph_factor(&config, 5.9), 1.1);
        assert_eq!(ph_factor(&config, 6.0), 1.0);
        assert_eq!(ph_factor(&config, 8.0), 1.0);
        assert_eq!(ph_factor(&config, 8.1), 0.9);
        assert_eq!(ph_factor(&config, f64::NAN), 1.0);
    }

    #[test]
    fn test_existing_nutrient_floor() {
        let config = AgronomyConfig::default();
        let soil = SoilSample {
            nitrogen: 100.0,
            phosphorus: 45.0,
            potassium: 500.0,
            ..SoilSample::default()
        };
        let f = existing_nutrient_factors(&config, &soil);
        assert!((f.nitrogen - (1.0 - 100.0 / 300.0)).abs() < 1e-12);
        // 1 - 45/50 = 0.1, floored
        assert_eq!(f.phosphorus, 0.3);
        assert_eq!(f.potassium, 0.3);
    }

    #[test]
    fn test_rainfall_and_temperature_thresholds_are_strict() {
        let config = AgronomyConfig::default();
        let soil = SoilSample::default();

        let f = AdjustmentFactors::resolve(&config, &soil, &weather(30.0, 5.0), None);
        assert_eq!(f.rainfall, 0.95);
        assert_eq!(f.temperature, 1.0);

        let f = AdjustmentFactors::resolve(&config, &soil, &weather(30.1, 5.1), None);
        assert_eq!(f.rainfall, 1.1);
        assert_eq!(f.temperature, 1.05);
    }

    #[test]
    fn test_crop_health_factor() {
        let config = AgronomyConfig::default();
        let soil = SoilSample::default();
        let w = weather(25.0, 0.0);
        let expected = [
            (CropHealth::Poor, 1.3),
            (CropHealth::Fair, 1.15),
            (CropHealth::Good, 1.0),
            (CropHealth::Excellent, 0.9),
        ];
        for (health, factor) in expected {
            let a = CropHealthAssessment::with_health(health);
            assert_eq!(AdjustmentFactors::resolve(&config, &soil, &w, Some(&a)).crop_health, factor);
        }
        assert_eq!(AdjustmentFactors::resolve(&config, &soil, &w, None).crop_health, 1.0);
    }

    #[test]
    fn test_rainfall_and_health_touch_nitrogen_only() {
        let config = AgronomyConfig::default();
        let soil = SoilSample::default();
        let base = NutrientRequirement::new(100.0, 100.0, 100.0);
        let poor = CropHealthAssessment::with_health(CropHealth::Poor);

        let dry = AdjustmentFactors::resolve(&config, &soil, &weather(25.0, 0.0), None).apply(&base);
        let wet = AdjustmentFactors::resolve(&config, &soil, &weather(25.0, 20.0), Some(&poor)).apply(&base);

        assert_eq!(dry, NutrientDosage { nitrogen: 95, phosphorus: 100, potassium: 100 });
        // 100 * 1.1 * 1.3 = 143
        assert_eq!(wet, NutrientDosage { nitrogen: 143, phosphorus: 100, potassium: 100 });
    }

    #[test]
    fn test_sandy_acidic_hot() {
        let config = AgronomyConfig::default();
        let soil = SoilSample {
            soil_type: SoilType::Sandy,
            ph: 5.5,
            nitrogen: 0.0,
            phosphorus: 0.0,
            potassium: 0.0,
            organic_carbon: 0.8,
        };
        let f = AdjustmentFactors::resolve(&config, &soil, &weather(34.0, 0.0), None);
        let d = f.apply(&NutrientRequirement::new(120.0, 60.0, 40.0));
        // N: 120 * 1.1 * 1.2 * 0.95 * 1.05 = 158.004
        // P: 60 * 1.1 * 1.1 * 1.05 = 76.23
        // K: 40 * 1.1 * 1.3 * 1.05 = 60.06
        assert_eq!(d, NutrientDosage { nitrogen: 158, phosphorus: 76, potassium: 60 });
    }

    #[test]
    fn test_negative_and_nan_inputs_never_panic() {
        let config = AgronomyConfig::default();
        let soil = SoilSample {
            nitrogen: -300.0,
            phosphorus: f64::NAN,
            ..SoilSample::default()
        };
        let f = AdjustmentFactors::resolve(&config, &soil, &weather(f64::NAN, f64::NAN), None);
        // 1 - (-300/300) = 2.0; NaN falls to the floor
        assert_eq!(f.existing.nitrogen, 2.0);
        assert_eq!(f.existing.phosphorus, 0.3);
        let d = f.apply(&NutrientRequirement::new(f64::NAN, 10.0, 10.0));
        assert_eq!(d.nitrogen, 0);
    }
}
