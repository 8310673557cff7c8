//! soilwise: fertilizer recommendations from soil, weather and crop health
//!
//! ## Architecture
//!
//! - **Engine**: deterministic dosage, product, schedule and score calculation
//! - **Config**: every agronomic constant, TOML-tunable with built-in defaults
//! - **Providers**: weather, soil health cards, crop analysis and price collaborators
//! - **Service**: validates a request, fills missing inputs, produces a report

pub mod config;
pub mod engine;
pub mod providers;
pub mod service;
pub mod types;

// Re-export configuration
pub use config::AgronomyConfig;

// Re-export the engine
pub use engine::{AdjustmentFactors, RecommendationEngine};

// Re-export commonly used types
pub use types::{
    CropHealth, CropHealthAssessment, NutrientDosage, RecommendationReport, RecommendationRequest,
    RecommendationResult, SoilSample, SoilType, SustainabilityBand, WeatherSnapshot,
};

pub use service::{RecommendationService, ServiceError};
