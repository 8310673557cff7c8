//! Request-scoped recommendation flow
//!
//! Validates a `RecommendationRequest`, fills missing soil and weather from
//! the collaborators, runs the engine and wraps the result in a report.
//! All state is passed through arguments; the service holds only its
//! collaborators.

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};

use crate::engine::{market_cost, RecommendationEngine};
use crate::providers::{
    CachedPriceProvider, PriceSource, ProviderError, SoilCardProvider, WeatherProvider,
};
use crate::types::{
    InputError, RecommendationReport, RecommendationRequest, SoilSample, WeatherSnapshot,
};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Invalid request: {0}")]
    Input(#[from] InputError),

    #[error("Collaborator failed: {0}")]
    Provider(#[from] ProviderError),
}

pub struct RecommendationService {
    engine: RecommendationEngine,
    soil_cards: Box<dyn SoilCardProvider>,
    weather: Box<dyn WeatherProvider>,
    prices: Option<CachedPriceProvider<Box<dyn PriceSource>>>,
}

impl RecommendationService {
    pub fn new(
        engine: RecommendationEngine,
        soil_cards: Box<dyn SoilCardProvider>,
        weather: Box<dyn WeatherProvider>,
    ) -> Self {
        Self {
            engine,
            soil_cards,
            weather,
            prices: None,
        }
    }

    /// Attach a price provider; reports then carry a market cost breakdown.
    pub fn with_prices(mut self, prices: CachedPriceProvider<Box<dyn PriceSource>>) -> Self {
        self.prices = Some(prices);
        self
    }

    pub fn engine(&self) -> &RecommendationEngine {
        &self.engine
    }

    /// Soil and weather for a request, looked up where not supplied.
    ///
    /// Soil lookup prefers `region` over `coordinates`.
    pub async fn resolve_inputs(
        &self,
        request: &RecommendationRequest,
    ) -> Result<(SoilSample, WeatherSnapshot), ServiceError> {
        let soil = match (&request.soil_data, &request.region, request.coordinates) {
            (Some(soil), _, _) => soil.clone(),
            (None, Some(region), _) => {
                let card = self.soil_cards.card_for_region(region).await?;
                info!(card = %card.card_number, location = %card.location, "Using soil health card");
                card.sample
            }
            (None, None, Some(coordinates)) => {
                let card = self.soil_cards.card_for_coordinates(coordinates).await?;
                info!(card = %card.card_number, location = %card.location, %coordinates, "Using soil health card");
                card.sample
            }
            (None, None, None) => return Err(InputError::MissingSoilData.into()),
        };

        let weather = match &request.weather_data {
            Some(weather) => weather.clone(),
            None => {
                let weather = self.weather.current(request.coordinates).await?;
                info!(
                    provider = self.weather.provider_name(),
                    temperature = weather.temperature,
                    rainfall = weather.rainfall,
                    "Using provider weather"
                );
                weather
            }
        };

        Ok((soil, weather))
    }

    /// Validate, resolve and compute one request.
    pub async fn recommend(&self, request: &RecommendationRequest) -> Result<RecommendationReport, ServiceError> {
        request.validate()?;
        let (soil, weather) = self.resolve_inputs(request).await?;
        soil.validate()?;
        weather.validate()?;

        let recommendation =
            self.engine
                .compute(&request.crop_type, &soil, &weather, request.crop_analysis.as_ref());
        let band = self.engine.sustainability_band(recommendation.sustainability_score);

        let market_cost = match &self.prices {
            Some(prices) => {
                let sheet = prices.current().await;
                let organic_needed = self.engine.needs_organic_amendment(&soil);
                Some(market_cost(&recommendation.fertilizer, organic_needed, &sheet))
            }
            None => None,
        };

        debug!(crop = %request.crop_type, score = recommendation.sustainability_score, band = ?band, "Report ready");

        Ok(RecommendationReport {
            generated_at: Utc::now(),
            crop_type: request.crop_type.clone(),
            recommendation,
            sustainability_band: band,
            sustainability_label: band.label(),
            market_cost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{RegionalSoilCards, StaticPriceSource, StaticWeatherProvider};
    use crate::config::PricingConfig;
    use crate::types::Coordinates;

    fn service() -> RecommendationService {
        RecommendationService::new(
            RecommendationEngine::default(),
            Box::new(RegionalSoilCards::new()),
            Box::new(StaticWeatherProvider::default()),
        )
    }

    fn request(crop: &str) -> RecommendationRequest {
        RecommendationRequest {
            crop_type: crop.to_string(),
            soil_data: None,
            weather_data: None,
            crop_analysis: None,
            region: None,
            coordinates: None,
        }
    }

    #[tokio::test]
    async fn test_region_soil_lookup() {
        let mut req = request("rice");
        req.region = Some("hills".to_string());
        let (soil, weather) = service().resolve_inputs(&req).await.unwrap();
        assert_eq!(soil.ph, 5.8);
        assert_eq!(weather, WeatherSnapshot::default());
    }

    #[tokio::test]
    async fn test_region_wins_over_coordinates() {
        let mut req = request("rice");
        req.region = Some("coastal".to_string());
        req.coordinates = Some(Coordinates::new(30.0, 76.0));
        let (soil, _) = service().resolve_inputs(&req).await.unwrap();
        assert_eq!(soil.organic_carbon, 0.6);
    }

    #[tokio::test]
    async fn test_invalid_request_is_rejected() {
        let err = service().recommend(&request("wheat")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Input(InputError::MissingSoilData)));
    }

    #[tokio::test]
    async fn test_unknown_region_surfaces_provider_error() {
        let mut req = request("wheat");
        req.region = Some("atlantis".to_string());
        let err = service().recommend(&req).await.unwrap_err();
        assert!(matches!(err, ServiceError::Provider(ProviderError::UnknownRegion(_))));
    }

    #[tokio::test]
    async fn test_report_with_market_cost() {
        let pricing = PricingConfig::default();
        let source: Box<dyn PriceSource> = Box::new(StaticPriceSource::new(pricing.clone()));
        let service = service().with_prices(CachedPriceProvider::new(source, &pricing));

        let mut req = request("wheat");
        req.region = Some("coastal".to_string());
        let report = service.recommend(&req).await.unwrap();

        let cost = report.market_cost.expect("market cost expected");
        // coastal soil has 0.6% organic carbon, so compost is priced in
        assert_eq!(cost.organic, 500);
        assert_eq!(
            cost.total,
            cost.nitrogen + cost.phosphorus + cost.potassium + cost.organic
        );
        assert_eq!(report.sustainability_label, report.sustainability_band.label());
    }
}
