//! Crop health analysis stand-in
//!
//! Real image analysis is an external service. This module keeps the parts
//! that are plain rules (deficiencies → overall health, care advice) and a
//! seeded mock analyzer for demos and tests.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use tracing::debug;

use super::ProviderError;
use crate::types::{CropHealth, CropHealthAssessment, DeficiencySeverity, Nutrient, NutrientDeficiency};

/// Overall health from the detected deficiencies.
///
/// None → excellent, exactly one (any severity) → good. With two or more,
/// any high-severity deficiency → poor, otherwise fair.
pub fn derive_crop_health(deficiencies: &[NutrientDeficiency]) -> CropHealth {
    match deficiencies.len() {
        0 => CropHealth::Excellent,
        1 => CropHealth::Good,
        _ if deficiencies.iter().any(|d| d.severity == DeficiencySeverity::High) => CropHealth::Poor,
        _ => CropHealth::Fair,
    }
}

/// Care advice shown next to an assessment.
pub fn care_recommendations(health: CropHealth, deficiencies: &[NutrientDeficiency]) -> Vec<String> {
    let mut recs = vec![
        "Monitor crop regularly for changes".to_string(),
        "Ensure adequate water supply".to_string(),
    ];

    if matches!(health, CropHealth::Poor | CropHealth::Fair) {
        recs.push("Consider foliar application of nutrients".to_string());
        recs.push("Improve soil drainage if needed".to_string());
    }

    for d in deficiencies {
        match d.severity {
            DeficiencySeverity::High => recs.push(format!("Immediate {} supplementation required", d.nutrient)),
            DeficiencySeverity::Moderate => recs.push(format!("Monitor and supplement {} as needed", d.nutrient)),
            DeficiencySeverity::Low => {}
        }
    }

    if deficiencies.is_empty() {
        recs.push("Maintain current nutrient management practices".to_string());
    }

    recs
}

/// Assessment from detected deficiencies, with derived health and advice.
pub fn assess(deficiencies: Vec<NutrientDeficiency>, confidence: f64) -> CropHealthAssessment {
    let crop_health = derive_crop_health(&deficiencies);
    let recommendations = care_recommendations(crop_health, &deficiencies);
    CropHealthAssessment {
        crop_health,
        deficiencies,
        recommendations,
        confidence,
    }
}

/// Analyzer of a crop image.
#[async_trait]
pub trait CropAnalyzer: Send + Sync {
    async fn analyze(&self, image: &[u8]) -> Result<CropHealthAssessment, ProviderError>;
}

// ============================================================================
// Mock Analyzer
// ============================================================================

const CANDIDATES: [Nutrient; 4] = [Nutrient::Nitrogen, Nutrient::Phosphorus, Nutrient::Potassium, Nutrient::Iron];
const SEVERITIES: [DeficiencySeverity; 3] =
    [DeficiencySeverity::Low, DeficiencySeverity::Moderate, DeficiencySeverity::High];

/// Ignores the image and reports up to two random deficiencies among N, P, K
/// and iron, each with detector confidence in 0.70-1.00.
pub struct MockCropAnalyzer {
    rng: Mutex<StdRng>,
}

impl MockCropAnalyzer {
    pub fn seeded(seed: u64) -> Self {
        Self { rng: Mutex::new(StdRng::seed_from_u64(seed)) }
    }
}

#[async_trait]
impl CropAnalyzer for MockCropAnalyzer {
    async fn analyze(&self, image: &[u8]) -> Result<CropHealthAssessment, ProviderError> {
        if image.is_empty() {
            return Err(ProviderError::Unavailable {
                source_name: "crop analyzer".to_string(),
                reason: "empty image".to_string(),
            });
        }

        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let count = rng.gen_range(0..=2);
        let deficiencies: Vec<NutrientDeficiency> = CANDIDATES
            .choose_multiple(&mut *rng, count)
            .map(|&nutrient| NutrientDeficiency {
                nutrient,
                severity: SEVERITIES[rng.gen_range(0..SEVERITIES.len())],
                confidence: (rng.gen_range(0.7..=1.0_f64) * 100.0).round() / 100.0,
                symptoms: nutrient.symptoms().iter().map(|s| (*s).to_string()).collect(),
            })
            .collect();
        let confidence = (rng.gen_range(0.85..=1.0_f64) * 100.0).round() / 100.0;
        drop(rng);

        let assessment = assess(deficiencies, confidence);
        debug!(
            health = %assessment.crop_health,
            deficiencies = assessment.deficiencies.len(),
            "Mock crop analysis"
        );
        Ok(assessment)
    }
}
