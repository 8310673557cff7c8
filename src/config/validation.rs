//! Config validation: unknown-key detection with Levenshtein suggestions
//! and agronomic range checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

use super::defaults::{MAX_SUGGESTION_DISTANCE, MAX_TYPICAL_BASE_KG_HA, MAX_TYPICAL_FACTOR};
use crate::types::{CropHealth, SoilType};

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Placeholder segment standing in for any crop name under `[crops]`.
pub const CROP_WILDCARD: &str = "*";

/// Returns the complete set of valid dotted key paths for AgronomyConfig.
///
/// Maintained by hand to match agronomy_config.rs. Crop rows are matched
/// through the `crops.*` wildcard.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [recommendation]
        "recommendation",
        "recommendation.default_crop",
        // [crops.<name>]
        "crops",
        "crops.*",
        "crops.*.nitrogen",
        "crops.*.phosphorus",
        "crops.*.potassium",
        // [adjustments]
        "adjustments",
        "adjustments.ph",
        "adjustments.ph.acidic_below",
        "adjustments.ph.acidic_factor",
        "adjustments.ph.alkaline_above",
        "adjustments.ph.alkaline_factor",
        "adjustments.soil_type",
        "adjustments.soil_type.sandy",
        "adjustments.soil_type.sandy.nitrogen",
        "adjustments.soil_type.sandy.phosphorus",
        "adjustments.soil_type.sandy.potassium",
        "adjustments.soil_type.loamy",
        "adjustments.soil_type.loamy.nitrogen",
        "adjustments.soil_type.loamy.phosphorus",
        "adjustments.soil_type.loamy.potassium",
        "adjustments.soil_type.clayey",
        "adjustments.soil_type.clayey.nitrogen",
        "adjustments.soil_type.clayey.phosphorus",
        "adjustments.soil_type.clayey.potassium",
        "adjustments.soil_type.silty",
        "adjustments.soil_type.silty.nitrogen",
        "adjustments.soil_type.silty.phosphorus",
        "adjustments.soil_type.silty.potassium",
        "adjustments.existing_nutrients",
        "adjustments.existing_nutrients.nitrogen_cap_ppm",
        "adjustments.existing_nutrients.phosphorus_cap_ppm",
        "adjustments.existing_nutrients.potassium_cap_ppm",
        "adjustments.existing_nutrients.floor",
        "adjustments.rainfall",
        "adjustments.rainfall.threshold_mm",
        "adjustments.rainfall.wet_factor",
        "adjustments.rainfall.dry_factor",
        "adjustments.temperature",
        "adjustments.temperature.threshold_c",
        "adjustments.temperature.hot_factor",
        "adjustments.crop_health",
        "adjustments.crop_health.poor",
        "adjustments.crop_health.fair",
        "adjustments.crop_health.good",
        "adjustments.crop_health.excellent",
        // [products]
        "products",
        "products.urea_nitrogen_fraction",
        "products.dap_phosphorus_fraction",
        "products.mop_potassium_fraction",
        "products.low_organic_carbon_pct",
        "products.compost_kg_per_ha",
        // [schedule]
        "schedule",
        "schedule.land_preparation_day",
        "schedule.planting_day",
        "schedule.vegetative_day",
        "schedule.reproductive_day",
        "schedule.planting_nitrogen_share",
        "schedule.vegetative_nitrogen_share",
        "schedule.reproductive_nitrogen_share",
        "schedule.reproductive_potassium_share",
        // [advisories]
        "advisories",
        "advisories.rainfall_mm",
        "advisories.temperature_c",
        "advisories.humidity_pct",
        "advisories.wind_speed_kmh",
        // [sustainability]
        "sustainability",
        "sustainability.base_score",
        "sustainability.high_organic_carbon_pct",
        "sustainability.high_organic_bonus",
        "sustainability.moderate_organic_carbon_pct",
        "sustainability.moderate_organic_bonus",
        "sustainability.precision_testing_bonus",
        "sustainability.weather_responsive_bonus",
        "sustainability.nutrient_load_limit_kg",
        "sustainability.nutrient_load_penalty",
        "sustainability.excellent_health_bonus",
        "sustainability.excellent_band_min",
        "sustainability.good_band_min",
        // [estimates]
        "estimates",
        "estimates.yield_base_pct",
        "estimates.yield_pivot_score",
        "estimates.yield_slope",
        "estimates.cost_per_kg_nitrogen",
        "estimates.cost_per_kg_phosphorus",
        "estimates.cost_per_kg_potassium",
        "estimates.organic_amendment_cost",
        // [pricing]
        "pricing",
        "pricing.nitrogen_per_kg",
        "pricing.phosphorus_per_kg",
        "pricing.potassium_per_kg",
        "pricing.organic_per_ha",
        "pricing.source",
        "pricing.cache_ttl_secs",
    ];
    keys.iter().copied().collect()
}

/// Replace the crop name in `crops.<name>...` with the wildcard segment.
fn normalize_key(key: &str) -> String {
    let mut parts: Vec<&str> = key.split('.').collect();
    if parts.len() >= 2 && parts[0] == "crops" {
        parts[1] = CROP_WILDCARD;
    }
    parts.join(".")
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

/// Dotted paths of every float in the tree that is NaN or infinite.
pub fn non_finite_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    match value {
        toml::Value::Float(f) if !f.is_finite() => keys.push(prefix.to_string()),
        toml::Value::Table(table) => {
            for (k, v) in table {
                let path = if prefix.is_empty() {
                    k.clone()
                } else {
                    format!("{prefix}.{k}")
                };
                keys.extend(non_finite_keys(v, &path));
            }
        }
        _ => {}
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let b_len = b_chars.len();
    if a.is_empty() {
        return b_len;
    }
    if b_len == 0 {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j + 1] + 1)
                .min(curr[j] + 1)
                .min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;
    for &k in known {
        let dist = levenshtein(unknown, k);
        if dist <= MAX_SUGGESTION_DISTANCE {
            match best {
                Some((best_key, best_dist)) if dist > best_dist || (dist == best_dist && k >= best_key) => {}
                _ => best = Some((k, dist)),
            }
        }
    }
    best.map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// Never fails on unknown keys, it only warns.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are handled by serde later
    };

    let known = known_config_keys();
    let mut warnings = Vec::new();

    for key in walk_toml_keys(&value, "") {
        let normalized = normalize_key(&key);
        if !known.contains(normalized.as_str()) {
            let suggestion = suggest_correction(&normalized, &known).map(|s| {
                // Put the user's crop name back into the suggestion
                match key.split('.').nth(1) {
                    Some(crop) if s.starts_with("crops.*") => s.replacen(CROP_WILDCARD, crop, 1),
                    _ => s,
                }
            });
            warnings.push(ValidationWarning {
                message: format!("Unknown config key '{key}'"),
                field: key,
                suggestion,
            });
        }
    }

    warnings
}

// ============================================================================
// Agronomic Range Validation
// ============================================================================

/// Validate agronomic ranges on a parsed AgronomyConfig.
///
/// Returns (errors, warnings). Errors are impossible values that must stop
/// the load; warnings are suspicious but usable.
pub fn validate_agronomic_ranges(
    config: &super::AgronomyConfig,
) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    // pH thresholds must sit inside the accepted soil pH range
    let ph = &config.adjustments.ph;
    for (name, value) in [("acidic_below", ph.acidic_below), ("alkaline_above", ph.alkaline_above)] {
        if !crate::types::PH_RANGE.contains(&value) {
            errors.push(format!(
                "adjustments.ph.{name} = {value:.2} is outside the soil pH range (3-14)"
            ));
        }
    }

    let a = &config.advisories;
    for (name, value) in [
        ("rainfall_mm", a.rainfall_mm),
        ("humidity_pct", a.humidity_pct),
        ("wind_speed_kmh", a.wind_speed_kmh),
    ] {
        if value < 0.0 {
            errors.push(format!("advisories.{name} = {value:.1} cannot be negative"));
        }
    }
    if a.humidity_pct > 100.0 {
        warnings.push(ValidationWarning {
            field: "advisories.humidity_pct".to_string(),
            message: format!(
                "advisories.humidity_pct = {:.1} can never trigger (humidity tops out at 100%)",
                a.humidity_pct
            ),
            suggestion: None,
        });
    }

    if config.adjustments.rainfall.threshold_mm < 0.0 {
        errors.push(format!(
            "adjustments.rainfall.threshold_mm = {:.1} cannot be negative",
            config.adjustments.rainfall.threshold_mm
        ));
    }

    // Unusually large crop rows
    for (name, req) in &config.crops {
        let biggest = req.nitrogen.max(req.phosphorus).max(req.potassium);
        if biggest > MAX_TYPICAL_BASE_KG_HA {
            warnings.push(ValidationWarning {
                field: format!("crops.{name}"),
                message: format!(
                    "crops.{name} requests {biggest:.0} kg/ha, above the typical maximum of {MAX_TYPICAL_BASE_KG_HA:.0}"
                ),
                suggestion: None,
            });
        }
    }

    // Unusually large multipliers
    let adj = &config.adjustments;
    let mut factors: Vec<(String, f64)> = vec![
        ("adjustments.ph.acidic_factor".to_string(), adj.ph.acidic_factor),
        ("adjustments.ph.alkaline_factor".to_string(), adj.ph.alkaline_factor),
        ("adjustments.rainfall.wet_factor".to_string(), adj.rainfall.wet_factor),
        ("adjustments.rainfall.dry_factor".to_string(), adj.rainfall.dry_factor),
        ("adjustments.temperature.hot_factor".to_string(), adj.temperature.hot_factor),
    ];
    for soil in SoilType::ALL {
        let f = adj.soil_type.factors(soil);
        factors.push((format!("adjustments.soil_type.{soil}.nitrogen"), f.nitrogen));
        factors.push((format!("adjustments.soil_type.{soil}.phosphorus"), f.phosphorus));
        factors.push((format!("adjustments.soil_type.{soil}.potassium"), f.potassium));
    }
    for health in CropHealth::ALL {
        factors.push((format!("adjustments.crop_health.{health}"), adj.crop_health.factor(health)));
    }
    for (field, value) in factors {
        if value > MAX_TYPICAL_FACTOR {
            warnings.push(ValidationWarning {
                message: format!("{field} = {value:.2} is above the typical maximum of {MAX_TYPICAL_FACTOR:.1}"),
                field,
                suggestion: None,
            });
        }
    }

    // Organic carbon bonus tiers must be ordered or the high tier is unreachable
    let s = &config.sustainability;
    if s.high_organic_carbon_pct < s.moderate_organic_carbon_pct {
        warnings.push(ValidationWarning {
            field: "sustainability.high_organic_carbon_pct".to_string(),
            message: format!(
                "sustainability.high_organic_carbon_pct ({:.2}) is below moderate_organic_carbon_pct ({:.2})",
                s.high_organic_carbon_pct, s.moderate_organic_carbon_pct
            ),
            suggestion: None,
        });
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================
