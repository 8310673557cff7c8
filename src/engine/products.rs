//! Stage C: commercial product quantities

use super::scoring::round_to_u32;
use crate::config::AgronomyConfig;
use crate::types::{NutrientDosage, ProductRecommendation, ProductType};

pub const UREA_NAME: &str = "Urea (46% N)";
pub const DAP_NAME: &str = "DAP (18-46-0)";
pub const MOP_NAME: &str = "Muriate of Potash (60% K2O)";
pub const COMPOST_NAME: &str = "Compost/FYM";

/// Soils below the organic carbon threshold get a compost amendment.
pub fn needs_organic_amendment(config: &AgronomyConfig, organic_carbon: f64) -> bool {
    organic_carbon < config.products.low_organic_carbon_pct
}

/// Urea, DAP and MOP always, plus compost when `organic_needed`.
pub fn derive_products(
    config: &AgronomyConfig,
    dosage: &NutrientDosage,
    organic_needed: bool,
) -> Vec<ProductRecommendation> {
    let p = &config.products;
    let mut products = vec![
        ProductRecommendation {
            name: UREA_NAME.to_string(),
            product_type: ProductType::Urea,
            quantity: round_to_u32(f64::from(dosage.nitrogen) / p.urea_nitrogen_fraction),
            application_timing: "Split application - 50% at planting, 30% at tillering, 20% at flowering"
                .to_string(),
            method: "Broadcasting and incorporation".to_string(),
        },
        ProductRecommendation {
            name: DAP_NAME.to_string(),
            product_type: ProductType::Dap,
            quantity: round_to_u32(f64::from(dosage.phosphorus) / p.dap_phosphorus_fraction),
            application_timing: "Full dose at planting".to_string(),
            method: "Band placement near seed".to_string(),
        },
        ProductRecommendation {
            name: MOP_NAME.to_string(),
            product_type: ProductType::Mop,
            quantity: round_to_u32(f64::from(dosage.potassium) / p.mop_potassium_fraction),
            application_timing: "50% at planting, 50% at flowering".to_string(),
            method: "Broadcasting and incorporation".to_string(),
        },
    ];

    if organic_needed {
        products.push(ProductRecommendation {
            name: COMPOST_NAME.to_string(),
            product_type: ProductType::Organic,
            quantity: p.compost_kg_per_ha,
            application_timing: "2-3 weeks before planting".to_string(),
            method: "Broadcasting and deep incorporation".to_string(),
        });
    }

    products
}
