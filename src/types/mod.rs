//! Shared data structures for fertilizer recommendations
//!
//! - Inputs: SoilSample, WeatherSnapshot, CropHealthAssessment
//! - Output: RecommendationResult (dosage, products, schedule, score)
//! - Collaborator records: SoilHealthCard, PriceSheet, RecommendationRequest

mod soil;
mod weather;
mod crop;
mod recommendation;
mod pricing;
mod request;

pub use soil::*;
pub use weather::*;
pub use crop::*;
pub use recommendation::*;
pub use pricing::*;
pub use request::*;
