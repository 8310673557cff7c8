//! Recommendation output types: NutrientDosage, ProductRecommendation,
//! ApplicationStage, RecommendationResult, SustainabilityBand, RecommendationReport

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MarketCost;

// ============================================================================
// Nutrient Dosage
// ============================================================================

/// Final N / P₂O₅ / K₂O dosage in kg/ha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NutrientDosage {
    pub nitrogen: u32,
    pub phosphorus: u32,
    pub potassium: u32,
}

impl NutrientDosage {
    pub fn total(&self) -> u32 {
        self.nitrogen
            .saturating_add(self.phosphorus)
            .saturating_add(self.potassium)
    }
}

// ============================================================================
// Products
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    Urea,
    Dap,
    Mop,
    Organic,
}

/// A commercial product to apply, with quantity in kg/ha of product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecommendation {
    pub name: String,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub quantity: u32,
    pub application_timing: String,
    pub method: String,
}

// ============================================================================
// Application Schedule
// ============================================================================

/// One stage of the split-application schedule.
///
/// `days_after_planting` is negative for pre-planting work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStage {
    pub stage: String,
    pub days_after_planting: i32,
    pub fertilizers: Vec<String>,
    pub quantity: String,
    pub method: String,
}

// ============================================================================
// Recommendation Result
// ============================================================================

/// Complete output of `RecommendationEngine::compute`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResult {
    pub fertilizer: NutrientDosage,
    pub products: Vec<ProductRecommendation>,
    pub application_schedule: Vec<ApplicationStage>,
    pub weather_considerations: Vec<String>,
    /// 0-100
    pub sustainability_score: u32,
    /// Percent
    pub expected_yield_increase: i32,
    /// Currency units per hectare
    pub cost_estimate: u32,
}

impl RecommendationResult {
    pub fn product(&self, product_type: ProductType) -> Option<&ProductRecommendation> {
        self.products.iter().find(|p| p.product_type == product_type)
    }

    pub fn stage(&self, name: &str) -> Option<&ApplicationStage> {
        self.application_schedule.iter().find(|s| s.stage == name)
    }
}

// ============================================================================
// Sustainability Band
// ============================================================================

/// Coarse label for the sustainability score shown to farmers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SustainabilityBand {
    Excellent,
    Good,
    NeedsImprovement,
}

impl SustainabilityBand {
    pub fn label(&self) -> &'static str {
        match self {
            SustainabilityBand::Excellent => "Excellent sustainability practices!",
            SustainabilityBand::Good => "Good environmental stewardship",
            SustainabilityBand::NeedsImprovement => "Room for sustainability improvement",
        }
    }
}

impl std::fmt::Display for SustainabilityBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Report (CLI output envelope)
// ============================================================================

/// What the command-line front end prints for a request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationReport {
    pub generated_at: DateTime<Utc>,
    pub crop_type: String,
    pub recommendation: RecommendationResult,
    pub sustainability_band: SustainabilityBand,
    pub sustainability_label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cost: Option<MarketCost>,
}
