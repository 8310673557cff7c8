//! Stages F and G: sustainability score, band, yield and cost estimates

use crate::config::AgronomyConfig;
use crate::types::{CropHealth, CropHealthAssessment, NutrientDosage, SoilSample, SustainabilityBand};

/// Round half away from zero for positive values (`floor(x + 0.5)`).
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Round and convert to an unsigned quantity. Negative and NaN values become 0.
pub fn round_to_u32(value: f64) -> u32 {
    round_half_up(value).max(0.0) as u32
}

/// Heuristic 0-100 sustainability index.
///
/// # Scoring Algorithm
///
/// Flat additive points on a base of 60 (defaults shown):
/// - +15 organic carbon above 1.5 %, else +10 above 1.0 %
/// - +10 precision (soil-test driven) application
/// - +10 weather-responsive timing
/// - -10 when total N+P+K exceeds 300 kg/ha
/// - +5 when the crop is in excellent health
///
/// # Arguments
///
/// * `config` - Score weights and thresholds from `[sustainability]`
/// * `soil` - Only `organic_carbon` is read
/// * `dosage` - Final rounded dosage
/// * `crop_health` - Optional image assessment
///
/// # Returns
///
/// Score clamped to 0-100 (100 = best).
pub fn sustainability_score(
    config: &AgronomyConfig,
    soil: &SoilSample,
    dosage: &NutrientDosage,
    crop_health: Option<&CropHealthAssessment>,
) -> u32 {
    let s = &config.sustainability;
    let mut score = s.base_score;

    if soil.organic_carbon > s.high_organic_carbon_pct {
        score += s.high_organic_bonus;
    } else if soil.organic_carbon > s.moderate_organic_carbon_pct {
        score += s.moderate_organic_bonus;
    }

    score += s.precision_testing_bonus;
    score += s.weather_responsive_bonus;

    if dosage.total() > s.nutrient_load_limit_kg {
        score -= s.nutrient_load_penalty;
    }

    if crop_health.is_some_and(|c| c.crop_health == CropHealth::Excellent) {
        score += s.excellent_health_bonus;
    }

    score.clamp(0, 100) as u32
}

pub fn sustainability_band(config: &AgronomyConfig, score: u32) -> SustainabilityBand {
    let s = &config.sustainability;
    if score >= s.excellent_band_min {
        SustainabilityBand::Excellent
    } else if score >= s.good_band_min {
        SustainabilityBand::Good
    } else {
        SustainabilityBand::NeedsImprovement
    }
}

/// Expected yield increase in percent: `round(5 + (score - 50) * 0.4)`.
pub fn expected_yield_increase(config: &AgronomyConfig, score: u32) -> i32 {
    let e = &config.estimates;
    round_half_up(e.yield_base_pct + (f64::from(score) - e.yield_pivot_score) * e.yield_slope) as i32
}

/// Rough input cost per hectare from the flat per-kg coefficients.
pub fn cost_estimate(config: &AgronomyConfig, dosage: &NutrientDosage, organic_needed: bool) -> u32 {
    let e = &config.estimates;
    let organic = if organic_needed { e.organic_amendment_cost } else { 0.0 };
    round_to_u32(
        e.cost_per_kg_nitrogen * f64::from(dosage.nitrogen)
            + e.cost_per_kg_phosphorus * f64::from(dosage.phosphorus)
            + e.cost_per_kg_potassium * f64::from(dosage.potassium)
            + organic,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn soil_with_oc(organic_carbon: f64) -> SoilSample {
        SoilSample { organic_carbon, ..SoilSample::default() }
    }

    fn dosage(n: u32, p: u32, k: u32) -> NutrientDosage {
        NutrientDosage { nitrogen: n, phosphorus: p, potassium: k }
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(2.4999), 2.0);
        assert_eq!(round_half_up(94.99), 95.0);
        assert_eq!(round_to_u32(-3.0), 0);
        assert_eq!(round_to_u32(f64::NAN), 0);
    }

    #[test]
    fn test_score_organic_carbon_tiers() {
        let config = AgronomyConfig::default();
        let d = dosage(100, 50, 50);
        assert_eq!(sustainability_score(&config, &soil_with_oc(1.0), &d, None), 80);
        assert_eq!(sustainability_score(&config, &soil_with_oc(1.2), &d, None), 90);
        assert_eq!(sustainability_score(&config, &soil_with_oc(1.5), &d, None), 90);
        assert_eq!(sustainability_score(&config, &soil_with_oc(1.51), &d, None), 95);
    }

    #[test]
    fn test_score_load_penalty_is_strictly_above_limit() {
        let config = AgronomyConfig::default();
        let soil = soil_with_oc(0.5);
        assert_eq!(sustainability_score(&config, &soil, &dosage(200, 60, 40), None), 80);
        assert_eq!(sustainability_score(&config, &soil, &dosage(200, 60, 41), None), 70);
    }

    #[test]
    fn test_score_excellent_health_bonus_and_clamp() {
        let config = AgronomyConfig::default();
        let excellent = CropHealthAssessment::with_health(CropHealth::Excellent);
        let good = CropHealthAssessment::with_health(CropHealth::Good);
        let soil = soil_with_oc(2.0);
        let d = dosage(50, 20, 20);
        assert_eq!(sustainability_score(&config, &soil, &d, Some(&good)), 95);
        assert_eq!(sustainability_score(&config, &soil, &d, Some(&excellent)), 100);

        let mut generous = AgronomyConfig::default();
        generous.sustainability.base_score = 95;
        assert_eq!(sustainability_score(&generous, &soil, &d, Some(&excellent)), 100);

        let mut harsh = AgronomyConfig::default();
        harsh.sustainability.base_score = -80;
        assert_eq!(sustainability_score(&harsh, &soil_with_oc(0.2), &dosage(300, 100, 100), None), 0);
    }

    #[test]
    fn test_bands() {
        let config = AgronomyConfig::default();
        assert_eq!(sustainability_band(&config, 100), SustainabilityBand::Excellent);
        assert_eq!(sustainability_band(&config, 80), SustainabilityBand::Excellent);
        assert_eq!(sustainability_band(&config, 79), SustainabilityBand::Good);
        assert_eq!(sustainability_band(&config, 60), SustainabilityBand::Good);
        assert_eq!(sustainability_band(&config, 59), SustainabilityBand::NeedsImprovement);
    }

    #[test]
    fn test_yield_increase() {
        let config = AgronomyConfig::default();
        assert_eq!(expected_yield_increase(&config, 80), 17);
        assert_eq!(expected_yield_increase(&config, 100), 25);
        assert_eq!(expected_yield_increase(&config, 50), 5);
        // 5 + (0 - 50) * 0.4 = -15
        assert_eq!(expected_yield_increase(&config, 0), -15);
    }

    #[test]
    fn test_cost_estimate() {
        let config = AgronomyConfig::default();
        // 0.8*95 + 1.2*48 + 0.6*30 = 151.6
        assert_eq!(cost_estimate(&config, &dosage(95, 48, 30), false), 152);
        assert_eq!(cost_estimate(&config, &dosage(95, 48, 30), true), 202);
        assert_eq!(cost_estimate(&config, &dosage(0, 0, 0), false), 0);
    }
}
