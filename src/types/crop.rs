//! Crop health types produced by the image-analysis collaborator

use serde::{Deserialize, Serialize};

/// Overall crop condition as judged from a leaf/canopy image.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CropHealth {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl CropHealth {
    pub const ALL: [CropHealth; 4] = [Self::Poor, Self::Fair, Self::Good, Self::Excellent];

    pub fn as_str(&self) -> &'static str {
        match self {
            CropHealth::Poor => "poor",
            CropHealth::Fair => "fair",
            CropHealth::Good => "good",
            CropHealth::Excellent => "excellent",
        }
    }
}

impl std::fmt::Display for CropHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Nutrients the analyzer can flag as deficient.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Nutrient {
    Nitrogen,
    Phosphorus,
    Potassium,
    Iron,
    Magnesium,
    Zinc,
}

impl Nutrient {
    pub fn as_str(&self) -> &'static str {
        match self {
            Nutrient::Nitrogen => "nitrogen",
            Nutrient::Phosphorus => "phosphorus",
            Nutrient::Potassium => "potassium",
            Nutrient::Iron => "iron",
            Nutrient::Magnesium => "magnesium",
            Nutrient::Zinc => "zinc",
        }
    }

    /// Visual symptoms reported alongside a deficiency.
    pub fn symptoms(&self) -> &'static [&'static str] {
        match self {
            Nutrient::Nitrogen => &[
                "Yellowing of lower leaves",
                "Stunted growth",
                "Reduced leaf size",
            ],
            Nutrient::Phosphorus => &[
                "Purple/reddish leaf coloration",
                "Delayed maturity",
                "Poor root development",
            ],
            Nutrient::Potassium => &["Brown leaf edges", "Weak stems", "Poor fruit quality"],
            Nutrient::Iron => &[
                "Interveinal chlorosis",
                "Young leaves turn yellow",
                "Stunted growth",
            ],
            Nutrient::Magnesium => &[
                "Interveinal chlorosis on older leaves",
                "Leaf curling",
                "Premature leaf drop",
            ],
            Nutrient::Zinc => &[
                "Shortened internodes",
                "Small, narrow leaves",
                "White or bronze leaf bands",
            ],
        }
    }
}

impl std::fmt::Display for Nutrient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum DeficiencySeverity {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientDeficiency {
    pub nutrient: Nutrient,
    pub severity: DeficiencySeverity,
    /// Detector confidence (0.0-1.0)
    pub confidence: f64,
    #[serde(default)]
    pub symptoms: Vec<String>,
}

/// Result of the external crop-image analysis step.
///
/// Only `crop_health` affects dosage; the rest is carried for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropHealthAssessment {
    pub crop_health: CropHealth,
    #[serde(default)]
    pub deficiencies: Vec<NutrientDeficiency>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub confidence: f64,
}

impl CropHealthAssessment {
    /// Assessment carrying only an overall health grade.
    pub fn with_health(crop_health: CropHealth) -> Self {
        Self {
            crop_health,
            deficiencies: Vec::new(),
            recommendations: Vec::new(),
            confidence: 0.0,
        }
    }
}
