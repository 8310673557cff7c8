//! Fertilizer market price types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Market prices per kg of nutrient (and per hectare for organic matter).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSheet {
    /// ₹ per kg N
    pub nitrogen: f64,
    /// ₹ per kg P₂O₅
    pub phosphorus: f64,
    /// ₹ per kg K₂O
    pub potassium: f64,
    /// ₹ per hectare of compost/FYM
    pub organic: f64,
    pub last_updated: DateTime<Utc>,
    pub source: String,
}

/// Cost of a dosage priced against a [`PriceSheet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketCost {
    pub nitrogen: u32,
    pub phosphorus: u32,
    pub potassium: u32,
    pub organic: u32,
    pub total: u32,
    pub source: String,
}
