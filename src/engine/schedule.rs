//! Stage D: split-application schedule

use super::products::COMPOST_NAME;
use super::scoring::round_to_u32;
use crate::config::AgronomyConfig;
use crate::types::{ApplicationStage, NutrientDosage};

pub const LAND_PREPARATION: &str = "Land Preparation";
pub const PLANTING: &str = "Planting";
pub const VEGETATIVE_GROWTH: &str = "Vegetative Growth";
pub const REPRODUCTIVE_PHASE: &str = "Reproductive Phase";

fn share(value: u32, fraction: f64) -> u32 {
    round_to_u32(f64::from(value) * fraction)
}

fn percent(fraction: f64) -> u32 {
    round_to_u32(fraction * 100.0)
}

/// Four fixed stages: land preparation, planting, vegetative, reproductive.
pub fn build_schedule(
    config: &AgronomyConfig,
    dosage: &NutrientDosage,
    organic_needed: bool,
) -> Vec<ApplicationStage> {
    let s = &config.schedule;
    let k_share = percent(s.reproductive_potassium_share);
    let basal_potash = format!("{}% K2O", 100 - k_share.min(100));

    let mut land_prep = Vec::with_capacity(3);
    if organic_needed {
        land_prep.push(COMPOST_NAME.to_string());
    }
    land_prep.push("Full P2O5".to_string());
    land_prep.push(basal_potash);

    vec![
        ApplicationStage {
            stage: LAND_PREPARATION.to_string(),
            days_after_planting: s.land_preparation_day,
            fertilizers: land_prep,
            quantity: "As recommended".to_string(),
            method: "Broadcasting and incorporation".to_string(),
        },
        ApplicationStage {
            stage: PLANTING.to_string(),
            days_after_planting: s.planting_day,
            fertilizers: vec![format!("{}% Nitrogen", percent(s.planting_nitrogen_share))],
            quantity: format!("{} kg N/ha", share(dosage.nitrogen, s.planting_nitrogen_share)),
            method: "Band placement or starter fertilizer".to_string(),
        },
        ApplicationStage {
            stage: VEGETATIVE_GROWTH.to_string(),
            days_after_planting: s.vegetative_day,
            fertilizers: vec![format!("{}% Nitrogen", percent(s.vegetative_nitrogen_share))],
            quantity: format!("{} kg N/ha", share(dosage.nitrogen, s.vegetative_nitrogen_share)),
            method: "Side dressing or foliar application".to_string(),
        },
        ApplicationStage {
            stage: REPRODUCTIVE_PHASE.to_string(),
            days_after_planting: s.reproductive_day,
            fertilizers: vec![
                format!("{}% Nitrogen", percent(s.reproductive_nitrogen_share)),
                format!("{k_share}% K2O"),
            ],
            quantity: format!(
                "{} kg N/ha + {} kg K2O/ha",
                share(dosage.nitrogen, s.reproductive_nitrogen_share),
                share(dosage.potassium, s.reproductive_potassium_share)
            ),
            method: "Foliar spray or fertigation".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order_and_days() {
        let config = AgronomyConfig::default();
        let schedule = build_schedule(&config, &NutrientDosage::default(), false);
        let stages: Vec<(&str, i32)> = schedule
            .iter()
            .map(|s| (s.stage.as_str(), s.days_after_planting))
            .collect();
        assert_eq!(
            stages,
            vec![
                (LAND_PREPARATION, -14),
                (PLANTING, 0),
                (VEGETATIVE_GROWTH, 30),
                (REPRODUCTIVE_PHASE, 60)
            ]
        );
    }

    #[test]
    fn test_quantity_strings() {
        let config = AgronomyConfig::default();
        let dosage = NutrientDosage { nitrogen: 95, phosphorus: 48, potassium: 30 };
        let schedule = build_schedule(&config, &dosage, false);

        assert_eq!(schedule[0].quantity, "As recommended");
        // 47.5 rounds up
        assert_eq!(schedule[1].quantity, "48 kg N/ha");
        assert_eq!(schedule[1].fertilizers, vec!["50% Nitrogen"]);
        // 28.5 rounds up
        assert_eq!(schedule[2].quantity, "29 kg N/ha");
        assert_eq!(schedule[2].fertilizers, vec!["30% Nitrogen"]);
        assert_eq!(schedule[3].quantity, "19 kg N/ha + 15 kg K2O/ha");
        assert_eq!(schedule[3].fertilizers, vec!["20% Nitrogen", "50% K2O"]);
    }

    #[test]
    fn test_land_preparation_fertilizers() {
        let config = AgronomyConfig::default();
        let with = build_schedule(&config, &NutrientDosage::default(), true);
        assert_eq!(with[0].fertilizers, vec!["Compost/FYM", "Full P2O5", "50% K2O"]);

        let without = build_schedule(&config, &NutrientDosage::default(), false);
        assert_eq!(without[0].fertilizers, vec!["Full P2O5", "50% K2O"]);
    }
}
