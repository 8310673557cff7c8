//! Stage A: base nutrient requirement lookup

use crate::config::{AgronomyConfig, NutrientRequirement, RICE_REQUIREMENT};

/// Base requirement row for a crop type, case-insensitive.
///
/// Unknown crops use the configured default crop, then the built-in rice row.
pub fn base_requirement(config: &AgronomyConfig, crop_type: &str) -> NutrientRequirement {
    config
        .crop(crop_type)
        .or_else(|| config.crop(&config.recommendation.default_crop))
        .copied()
        .unwrap_or(RICE_REQUIREMENT)
}

/// Whether the crop has its own row (no fallback involved).
pub fn is_known_crop(config: &AgronomyConfig, crop_type: &str) -> bool {
    config.crop(crop_type).is_some()
}
