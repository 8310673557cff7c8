//! Regional soil health cards
//!
//! Six reference cards keyed by agro-climatic region. Coordinates are mapped
//! onto a region by latitude/longitude boxes, checked in a fixed order.

use async_trait::async_trait;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use tracing::{debug, warn};

use super::ProviderError;
use crate::config::defaults::FALLBACK_REGION;
use crate::types::{Coordinates, SoilHealthCard, SoilSample, SoilType};

/// Source of soil health cards.
#[async_trait]
pub trait SoilCardProvider: Send + Sync {
    async fn card_for_region(&self, region: &str) -> Result<SoilHealthCard, ProviderError>;

    async fn card_for_coordinates(&self, coordinates: Coordinates) -> Result<SoilHealthCard, ProviderError> {
        if !coordinates.is_valid() {
            return Err(ProviderError::InvalidCoordinates {
                lat: coordinates.lat,
                lon: coordinates.lon,
            });
        }
        self.card_for_region(region_for_coordinates(coordinates)).await
    }
}

// ============================================================================
// Region Lookup
// ============================================================================

struct RegionBox {
    region: &'static str,
    lat: (f64, f64),
    lon: (f64, f64),
}

/// Checked top to bottom; the first box containing the point wins.
const REGION_BOXES: [RegionBox; 7] = [
    RegionBox { region: "north_plains", lat: (28.0, 32.0), lon: (74.0, 78.0) },
    RegionBox { region: "south_plains", lat: (8.0, 15.0), lon: (76.0, 80.0) },
    RegionBox { region: "west_plains", lat: (15.0, 25.0), lon: (72.0, 78.0) },
    RegionBox { region: "east_plains", lat: (22.0, 28.0), lon: (84.0, 90.0) },
    // west and east coastlines
    RegionBox { region: "coastal", lat: (8.0, 20.0), lon: (68.0, 76.0) },
    RegionBox { region: "coastal", lat: (8.0, 20.0), lon: (80.0, 88.0) },
    RegionBox { region: "hills", lat: (25.0, 35.0), lon: (75.0, 85.0) },
];

/// Region name for a point, `north_plains` when no box matches.
pub fn region_for_coordinates(coordinates: Coordinates) -> &'static str {
    REGION_BOXES
        .iter()
        .find(|b| {
            (b.lat.0..=b.lat.1).contains(&coordinates.lat) && (b.lon.0..=b.lon.1).contains(&coordinates.lon)
        })
        .map_or(FALLBACK_REGION, |b| b.region)
}

/// Card numbers look like `SHC-NP-2024-001`: the `SHC-` prefix and at least
/// ten characters.
pub fn validate_card_number(card_number: &str) -> Result<(), ProviderError> {
    let trimmed = card_number.trim();
    if trimmed.starts_with("SHC-") && trimmed.len() >= 10 {
        Ok(())
    } else {
        Err(ProviderError::InvalidCardNumber(card_number.to_string()))
    }
}

// ============================================================================
// Reference Cards
// ============================================================================

struct CardRow {
    region: &'static str,
    location: &'static str,
    card_number: &'static str,
    date: (i32, u32, u32),
    soil_type: SoilType,
    // pH, N, P, K, OC
    nutrients: [f64; 5],
    // EC, S, Zn, B, Fe, Mn, Cu
    trace: [f64; 7],
}

const CARDS: [CardRow; 6] = [
    CardRow {
        region: "north_plains",
        location: "North Plains",
        card_number: "SHC-NP-2024-001",
        date: (2024, 1, 15),
        soil_type: SoilType::Loamy,
        nutrients: [7.2, 165.0, 28.0, 135.0, 0.8],
        trace: [0.3, 12.0, 0.8, 0.5, 8.5, 3.2, 1.1],
    },
    CardRow {
        region: "south_plains",
        location: "South Plains",
        card_number: "SHC-SP-2024-002",
        date: (2024, 2, 10),
        soil_type: SoilType::Clayey,
        nutrients: [6.8, 145.0, 22.0, 115.0, 1.2],
        trace: [0.4, 15.0, 0.6, 0.4, 12.3, 4.5, 0.9],
    },
    CardRow {
        region: "west_plains",
        location: "West Plains",
        card_number: "SHC-WP-2024-003",
        date: (2024, 1, 28),
        soil_type: SoilType::Silty,
        nutrients: [7.8, 125.0, 18.0, 98.0, 0.9],
        trace: [0.5, 10.0, 0.4, 0.3, 6.8, 2.8, 0.7],
    },
    CardRow {
        region: "east_plains",
        location: "East Plains",
        card_number: "SHC-EP-2024-004",
        date: (2024, 2, 5),
        soil_type: SoilType::Clayey,
        nutrients: [6.2, 180.0, 35.0, 158.0, 1.8],
        trace: [0.2, 18.0, 1.2, 0.6, 15.2, 6.1, 1.4],
    },
    CardRow {
        region: "coastal",
        location: "Coastal Region",
        card_number: "SHC-CR-2024-005",
        date: (2024, 1, 20),
        soil_type: SoilType::Sandy,
        nutrients: [8.1, 95.0, 15.0, 78.0, 0.6],
        trace: [0.8, 8.0, 0.3, 0.2, 4.5, 1.8, 0.5],
    },
    CardRow {
        region: "hills",
        location: "Hill Region",
        card_number: "SHC-HR-2024-006",
        date: (2024, 2, 12),
        soil_type: SoilType::Loamy,
        nutrients: [5.8, 210.0, 42.0, 185.0, 2.5],
        trace: [0.1, 22.0, 1.8, 0.8, 18.5, 8.2, 1.9],
    },
];

impl CardRow {
    fn to_card(&self) -> SoilHealthCard {
        let [ph, nitrogen, phosphorus, potassium, organic_carbon] = self.nutrients;
        let [electrical_conductivity, sulfur, zinc, boron, iron, manganese, copper] = self.trace;
        let (y, m, d) = self.date;
        SoilHealthCard {
            card_number: self.card_number.to_string(),
            location: self.location.to_string(),
            sample: SoilSample {
                soil_type: self.soil_type,
                ph,
                nitrogen,
                phosphorus,
                potassium,
                organic_carbon,
            },
            electrical_conductivity,
            sulfur,
            zinc,
            boron,
            iron,
            manganese,
            copper,
            last_updated: NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
        }
    }
}

// ============================================================================
// Provider
// ============================================================================

/// Serves the reference cards, optionally with seeded field-to-field variation
/// (pH ±0.2, N ±15, P ±5, K ±20, OC ±0.2).
pub struct RegionalSoilCards {
    variation: Option<Mutex<StdRng>>,
}

impl Default for RegionalSoilCards {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionalSoilCards {
    /// Exact reference values.
    pub fn new() -> Self {
        Self { variation: None }
    }

    /// Reference values perturbed by a reproducible RNG.
    pub fn with_variation(seed: u64) -> Self {
        Self { variation: Some(Mutex::new(StdRng::seed_from_u64(seed))) }
    }

    /// Region names in table order.
    pub fn regions() -> Vec<&'static str> {
        CARDS.iter().map(|c| c.region).collect()
    }

    /// Unperturbed card for a region.
    pub fn reference_card(region: &str) -> Option<SoilHealthCard> {
        let key = region.trim().to_lowercase();
        CARDS.iter().find(|c| c.region == key).map(CardRow::to_card)
    }

    fn vary(&self, card: &mut SoilHealthCard) {
        let Some(rng) = &self.variation else {
            return;
        };
        let mut rng = match rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let s = &mut card.sample;
        s.ph = ((s.ph + rng.gen_range(-0.2..=0.2)) * 10.0).round() / 10.0;
        s.nitrogen = (s.nitrogen + rng.gen_range(-15.0..=15.0)).round().max(0.0);
        s.phosphorus = (s.phosphorus + rng.gen_range(-5.0..=5.0)).round().max(0.0);
        s.potassium = (s.potassium + rng.gen_range(-20.0..=20.0)).round().max(0.0);
        s.organic_carbon = (((s.organic_carbon + rng.gen_range(-0.2..=0.2)) * 10.0).round() / 10.0).max(0.1);
    }
}

#[async_trait]
impl SoilCardProvider for RegionalSoilCards {
    async fn card_for_region(&self, region: &str) -> Result<SoilHealthCard, ProviderError> {
        let Some(mut card) = Self::reference_card(region) else {
            warn!(region, "No soil health card for region");
            return Err(ProviderError::UnknownRegion(region.to_string()));
        };
        self.vary(&mut card);
        debug!(region, card = %card.card_number, ph = card.sample.ph, "Soil health card loaded");
        Ok(card)
    }
}
