//! Market cost of a dosage against a live price sheet

use super::scoring::round_to_u32;
use crate::types::{MarketCost, NutrientDosage, PriceSheet};

/// Price each nutrient at the sheet's per-kg rate, plus compost when needed.
pub fn market_cost(dosage: &NutrientDosage, organic_needed: bool, prices: &PriceSheet) -> MarketCost {
    let nitrogen = round_to_u32(f64::from(dosage.nitrogen) * prices.nitrogen);
    let phosphorus = round_to_u32(f64::from(dosage.phosphorus) * prices.phosphorus);
    let potassium = round_to_u32(f64::from(dosage.potassium) * prices.potassium);
    let organic = if organic_needed { round_to_u32(prices.organic) } else { 0 };

    MarketCost {
        nitrogen,
        phosphorus,
        potassium,
        organic,
        total: nitrogen
            .saturating_add(phosphorus)
            .saturating_add(potassium)
            .saturating_add(organic),
        source: prices.source.clone(),
    }
}
