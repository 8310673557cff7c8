//! Quick single-product prediction
//!
//! A lightweight alternative to `compute`: picks one fertilizer product and
//! an amount from the soil test alone. Readings are standardised against
//! fixed training statistics, and the first nutrient more than half a
//! standard deviation below its mean decides the product. Crop and soil
//! multipliers then scale the amount.
//!
//! Pure and deterministic like the rest of the engine.

use serde::{Deserialize, Serialize};

use super::scoring::round_to_u32;
use crate::types::InputError;

/// Version tag reported with every prediction.
pub const MODEL_VERSION: &str = "1.0";

// ============================================================================
// Model Constants
// ============================================================================

/// (mean, standard deviation) of the training data per reading.
const NITROGEN_STATS: (f64, f64) = (50.0, 25.0);
const PHOSPHORUS_STATS: (f64, f64) = (30.0, 15.0);
const POTASSIUM_STATS: (f64, f64) = (40.0, 20.0);

/// A standardised reading below this is treated as deficient.
const DEFICIENT_Z: f64 = -0.5;

/// Outside this pH window the balanced NPK dose is raised.
const BALANCED_PH: (f64, f64) = (6.0, 8.0);

/// Crop multipliers; unlisted crops use 1.0.
const CROP_MULTIPLIERS: [(&str, f64); 8] = [
    ("rice", 1.2),
    ("wheat", 1.0),
    ("maize", 1.1),
    ("cotton", 1.3),
    ("sugarcane", 1.4),
    ("potato", 0.9),
    ("tomato", 0.8),
    ("onion", 0.7),
];

/// Soil multipliers; unlisted soils use 1.0.
const SOIL_MULTIPLIERS: [(&str, f64); 6] = [
    ("clay", 1.1),
    ("loam", 1.0),
    ("sandy", 0.9),
    ("silt", 1.05),
    ("black", 1.2),
    ("red", 0.95),
];

const LIME_ADVICE: &str = "Consider lime application to increase soil pH";
const SULFUR_ADVICE: &str = "Consider sulfur application to decrease soil pH";
const COMPOST_ADVICE: &str = "Increase organic matter through compost or farmyard manure";
const SOIL_TEST_ADVICE: &str = "Consider soil testing for more accurate recommendations";

/// Organic carbon (%) below which compost is advised.
const LOW_ORGANIC_CARBON_PCT: f64 = 0.5;

/// Predictions below this confidence suggest a fresh soil test.
const SOIL_TEST_CONFIDENCE: f64 = 0.75;

// ============================================================================
// Types
// ============================================================================

/// Soil test submitted for a quick prediction.
///
/// Weather fields are accepted for compatibility and currently unused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickPredictionInput {
    #[serde(rename = "N")]
    pub nitrogen: f64,
    #[serde(rename = "P")]
    pub phosphorus: f64,
    #[serde(rename = "K")]
    pub potassium: f64,
    #[serde(rename = "pH")]
    pub ph: f64,
    #[serde(default)]
    pub organic_carbon: f64,
    #[serde(default)]
    pub crop_type: String,
    #[serde(default)]
    pub soil_type: String,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub rainfall: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
}

impl QuickPredictionInput {
    /// N, P, K and pH are required; zero counts as missing.
    pub fn validate(&self) -> Result<(), InputError> {
        for (field, value) in [
            ("N", self.nitrogen),
            ("P", self.phosphorus),
            ("K", self.potassium),
            ("pH", self.ph),
        ] {
            if value == 0.0 || !value.is_finite() {
                return Err(InputError::MissingParameter(field));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuickFertilizer {
    Urea,
    #[serde(rename = "DAP")]
    Dap,
    #[serde(rename = "MOP")]
    Mop,
    #[serde(rename = "NPK")]
    Npk,
}

impl QuickFertilizer {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuickFertilizer::Urea => "Urea",
            QuickFertilizer::Dap => "DAP",
            QuickFertilizer::Mop => "MOP",
            QuickFertilizer::Npk => "NPK",
        }
    }
}

impl std::fmt::Display for QuickFertilizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One product, its amount in kg/ha and the rule's confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickPrediction {
    #[serde(rename = "type")]
    pub fertilizer: QuickFertilizer,
    pub amount: u32,
    pub confidence: f64,
}

/// Prediction plus follow-up advice, as printed by the `predict` command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickPredictionReport {
    pub prediction: QuickPrediction,
    pub recommendations: Vec<String>,
    pub confidence: f64,
    pub model_version: &'static str,
}

// ============================================================================
// Prediction
// ============================================================================

fn standardise(value: f64, (mean, std_dev): (f64, f64)) -> f64 {
    (value - mean) / std_dev
}

fn lookup(table: &[(&str, f64)], key: &str) -> f64 {
    let key = key.trim().to_lowercase();
    table.iter().find(|(name, _)| *name == key).map_or(1.0, |(_, m)| *m)
}

/// Amount multiplier for a crop.
pub fn crop_multiplier(crop_type: &str) -> f64 {
    lookup(&CROP_MULTIPLIERS, crop_type)
}

/// Amount multiplier for a soil. Texture names (`clayey`, `loamy`, `silty`)
/// are accepted alongside the short forms.
pub fn soil_multiplier(soil_type: &str) -> f64 {
    let key = soil_type.trim().to_lowercase();
    let short = match key.as_str() {
        "clayey" => "clay",
        "loamy" => "loam",
        "silty" => "silt",
        other => other,
    };
    lookup(&SOIL_MULTIPLIERS, short)
}

/// Pick one product for a soil test.
///
/// Rules, first match wins:
/// - N deficient → Urea, `max(20, 50 - N)`, 0.85
/// - P deficient → DAP, `max(15, 40 - P)`, 0.82
/// - K deficient → MOP, `max(18, 45 - K)`, 0.80
/// - pH outside 6-8 → NPK 25, 0.75
/// - otherwise → NPK 20, 0.70
///
/// The amount is then multiplied by the crop and soil multipliers and rounded.
pub fn predict(input: &QuickPredictionInput) -> QuickPrediction {
    let (fertilizer, amount, confidence) = if standardise(input.nitrogen, NITROGEN_STATS) < DEFICIENT_Z {
        (QuickFertilizer::Urea, (50.0 - input.nitrogen).max(20.0), 0.85)
    } else if standardise(input.phosphorus, PHOSPHORUS_STATS) < DEFICIENT_Z {
        (QuickFertilizer::Dap, (40.0 - input.phosphorus).max(15.0), 0.82)
    } else if standardise(input.potassium, POTASSIUM_STATS) < DEFICIENT_Z {
        (QuickFertilizer::Mop, (45.0 - input.potassium).max(18.0), 0.80)
    } else if input.ph < BALANCED_PH.0 || input.ph > BALANCED_PH.1 {
        (QuickFertilizer::Npk, 25.0, 0.75)
    } else {
        (QuickFertilizer::Npk, 20.0, 0.70)
    };

    let scaled = amount * crop_multiplier(&input.crop_type) * soil_multiplier(&input.soil_type);

    QuickPrediction {
        fertilizer,
        amount: round_to_u32(scaled),
        confidence,
    }
}

/// Application line followed by pH, organic matter and soil-test advice.
pub fn detailed_recommendations(input: &QuickPredictionInput, prediction: &QuickPrediction) -> Vec<String> {
    let mut recs = vec![format!(
        "Apply {}kg/hectare of {}",
        prediction.amount, prediction.fertilizer
    )];

    if input.ph < BALANCED_PH.0 {
        recs.push(LIME_ADVICE.to_string());
    } else if input.ph > BALANCED_PH.1 {
        recs.push(SULFUR_ADVICE.to_string());
    }

    if input.organic_carbon < LOW_ORGANIC_CARBON_PCT {
        recs.push(COMPOST_ADVICE.to_string());
    }

    if prediction.confidence < SOIL_TEST_CONFIDENCE {
        recs.push(SOIL_TEST_ADVICE.to_string());
    }

    recs
}

/// Prediction and advice in one report.
pub fn quick_report(input: &QuickPredictionInput) -> QuickPredictionReport {
    let prediction = predict(input);
    let recommendations = detailed_recommendations(input, &prediction);
    QuickPredictionReport {
        confidence: prediction.confidence,
        prediction,
        recommendations,
        model_version: MODEL_VERSION,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(n: f64, p: f64, k: f64, ph: f64) -> QuickPredictionInput {
        QuickPredictionInput {
            nitrogen: n,
            phosphorus: p,
            potassium: k,
            ph,
            organic_carbon: 1.2,
            crop_type: "wheat".to_string(),
            soil_type: "loam".to_string(),
            temperature: None,
            rainfall: None,
            humidity: None,
        }
    }

    #[test]
    fn test_low_nitrogen_picks_urea() {
        let p = predict(&input(10.0, 40.0, 50.0, 7.0));
        assert_eq!(p.fertilizer, QuickFertilizer::Urea);
        assert_eq!(p.amount, 40);
        assert_eq!(p.confidence, 0.85);
    }

    #[test]
    fn test_urea_amount_has_a_minimum() {
        // z = (35 - 50) / 25 = -0.6, amount max(20, 15)
        let p = predict(&input(35.0, 40.0, 50.0, 7.0));
        assert_eq!(p.fertilizer, QuickFertilizer::Urea);
        assert_eq!(p.amount, 20);
    }

    #[test]
    fn test_deficiency_threshold_is_strict() {
        // z = (37.5 - 50) / 25 = -0.5 exactly, not deficient
        let p = predict(&input(37.5, 40.0, 50.0, 7.0));
        assert_eq!(p.fertilizer, QuickFertilizer::Npk);
    }

    #[test]
    fn test_low_phosphorus_picks_dap() {
        let p = predict(&input(60.0, 10.0, 50.0, 7.0));
        assert_eq!(p.fertilizer, QuickFertilizer::Dap);
        assert_eq!(p.amount, 30);
        assert_eq!(p.confidence, 0.82);
    }

    #[test]
    fn test_low_potassium_picks_mop() {
        let p = predict(&input(60.0, 40.0, 20.0, 7.0));
        assert_eq!(p.fertilizer, QuickFertilizer::Mop);
        assert_eq!(p.amount, 25);
        assert_eq!(p.confidence, 0.8);
    }

    #[test]
    fn test_nitrogen_rule_wins_over_others() {
        let p = predict(&input(10.0, 5.0, 5.0, 4.5));
        assert_eq!(p.fertilizer, QuickFertilizer::Urea);
    }

    #[test]
    fn test_unbalanced_ph_raises_npk() {
        let acidic = predict(&input(60.0, 40.0, 50.0, 5.5));
        assert_eq!((acidic.fertilizer, acidic.amount, acidic.confidence), (QuickFertilizer::Npk, 25, 0.75));
        let alkaline = predict(&input(60.0, 40.0, 50.0, 8.5));
        assert_eq!(alkaline.amount, 25);
        // boundaries are balanced
        assert_eq!(predict(&input(60.0, 40.0, 50.0, 6.0)).amount, 20);
        assert_eq!(predict(&input(60.0, 40.0, 50.0, 8.0)).amount, 20);
    }

    #[test]
    fn test_balanced_soil_gets_npk_20() {
        let p = predict(&input(60.0, 40.0, 50.0, 7.0));
        assert_eq!((p.fertilizer, p.amount, p.confidence), (QuickFertilizer::Npk, 20, 0.7));
    }

    #[test]
    fn test_crop_and_soil_multipliers() {
        let mut i = input(10.0, 40.0, 50.0, 7.0);
        i.crop_type = "Rice".to_string();
        i.soil_type = "clay".to_string();
        // 40 * 1.2 * 1.1 = 52.8
        assert_eq!(predict(&i).amount, 53);

        i.crop_type = "onion".to_string();
        i.soil_type = "red".to_string();
        // 40 * 0.7 * 0.95 = 26.6
        assert_eq!(predict(&i).amount, 27);

        i.crop_type = "barley".to_string();
        i.soil_type = "peat".to_string();
        assert_eq!(predict(&i).amount, 40);
    }

    #[test]
    fn test_texture_names_map_to_short_soil_names() {
        assert_eq!(soil_multiplier("clayey"), soil_multiplier("clay"));
        assert_eq!(soil_multiplier("Silty"), 1.05);
        assert_eq!(soil_multiplier("loamy"), 1.0);
        assert_eq!(crop_multiplier("sugarcane"), 1.4);
    }

    #[test]
    fn test_advice_for_acidic_low_carbon_soil() {
        let mut i = input(60.0, 40.0, 50.0, 5.2);
        i.organic_carbon = 0.3;
        let report = quick_report(&i);
        assert_eq!(
            report.recommendations,
            vec![
                "Apply 25kg/hectare of NPK",
                LIME_ADVICE,
                COMPOST_ADVICE,
            ]
        );
        assert_eq!(report.confidence, 0.75);
        assert_eq!(report.model_version, "1.0");
    }

    #[test]
    fn test_advice_for_alkaline_soil_and_low_confidence() {
        let alkaline = input(10.0, 40.0, 50.0, 8.6);
        let recs = quick_report(&alkaline).recommendations;
        assert_eq!(recs, vec!["Apply 40kg/hectare of Urea", SULFUR_ADVICE]);

        let balanced = input(60.0, 40.0, 50.0, 7.0);
        let recs = quick_report(&balanced).recommendations;
        assert_eq!(recs, vec!["Apply 20kg/hectare of NPK", SOIL_TEST_ADVICE]);
    }

    #[test]
    fn test_validation_treats_zero_as_missing() {
        assert!(input(60.0, 40.0, 50.0, 7.0).validate().is_ok());
        assert_eq!(
            input(0.0, 40.0, 50.0, 7.0).validate(),
            Err(InputError::MissingParameter("N"))
        );
        assert_eq!(
            input(60.0, 40.0, 50.0, f64::NAN).validate(),
            Err(InputError::MissingParameter("pH"))
        );
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{"N": 20, "P": 35, "K": 45, "pH": 6.8, "organicCarbon": 0.9,
                       "cropType": "maize", "soilType": "black", "rainfall": 4.0}"#;
        let i: QuickPredictionInput = serde_json::from_str(json).unwrap();
        let report = serde_json::to_value(quick_report(&i)).unwrap();
        assert_eq!(report["prediction"]["type"], "Urea");
        // max(20, 30) * 1.1 * 1.2 = 39.6
        assert_eq!(report["prediction"]["amount"], 40);
        assert_eq!(report["modelVersion"], "1.0");
    }
}
