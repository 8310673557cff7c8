//! Service Integration Tests
//!
//! Request JSON → collaborators → engine → report, with seeded mocks so
//! every run is reproducible.

use soilwise::config::PricingConfig;
use soilwise::providers::{
    assess, CachedPriceProvider, CropAnalyzer, MockCropAnalyzer, MockWeatherProvider, OpenWeatherProvider,
    PriceSource, RegionalSoilCards, SoilCardProvider, StaticPriceSource, StaticWeatherProvider, WeatherProvider,
};
use soilwise::types::{Coordinates, DeficiencySeverity, Nutrient, NutrientDeficiency};
use soilwise::{
    CropHealth, RecommendationEngine, RecommendationRequest, RecommendationService, ServiceError,
    WeatherSnapshot,
};

fn service_with_seed(seed: u64) -> RecommendationService {
    RecommendationService::new(
        RecommendationEngine::default(),
        Box::new(RegionalSoilCards::new()),
        Box::new(MockWeatherProvider::seeded(seed)),
    )
}

fn parse(json: &str) -> RecommendationRequest {
    serde_json::from_str(json).expect("valid request JSON")
}

#[tokio::test]
async fn full_request_needs_no_collaborators() {
    let request = parse(
        r#"{
            "cropType": "wheat",
            "soilData": {"soilType": "loamy", "pH": 6.5, "nitrogen": 100,
                         "phosphorus": 20, "potassium": 100, "organicCarbon": 1.0},
            "weatherData": {"temperature": 25, "humidity": 50, "rainfall": 3, "windSpeed": 5}
        }"#,
    );
    let report = service_with_seed(1).recommend(&request).await.unwrap();

    assert_eq!(report.crop_type, "wheat");
    assert_eq!(report.recommendation.fertilizer.nitrogen, 95);
    assert_eq!(report.recommendation.fertilizer.phosphorus, 48);
    assert_eq!(report.recommendation.fertilizer.potassium, 30);
    assert_eq!(report.sustainability_label, "Excellent sustainability practices!");
    assert!(report.market_cost.is_none());

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["sustainabilityBand"], "excellent");
    assert!(json.get("marketCost").is_none());
}

#[tokio::test]
async fn seeded_weather_gives_reproducible_reports() {
    let request = parse(r#"{"cropType": "maize", "region": "east_plains"}"#);
    let a = service_with_seed(2024).recommend(&request).await.unwrap();
    let b = service_with_seed(2024).recommend(&request).await.unwrap();
    assert_eq!(a.recommendation, b.recommendation);
}

#[tokio::test]
async fn coordinates_pick_the_regional_card() {
    let request = parse(r#"{"cropType": "rice", "coordinates": {"lat": 10.5, "lon": 72.0}}"#);
    let service = service_with_seed(5);
    let (soil, weather) = service.resolve_inputs(&request).await.unwrap();

    let coastal = RegionalSoilCards::reference_card("coastal").unwrap();
    assert_eq!(soil, coastal.sample);
    assert_eq!(weather.location, "Your Location");

    // coastal soil is low in organic carbon
    let report = service.recommend(&request).await.unwrap();
    assert_eq!(report.recommendation.products.len(), 4);
}

#[tokio::test]
async fn bad_soil_data_is_rejected_before_compute() {
    let request = parse(
        r#"{
            "cropType": "rice",
            "soilData": {"soilType": "sandy", "pH": 2.0, "nitrogen": 10,
                         "phosphorus": 10, "potassium": 10, "organicCarbon": 0.5}
        }"#,
    );
    let err = service_with_seed(1).recommend(&request).await.unwrap_err();
    assert!(matches!(err, ServiceError::Input(_)), "{err}");
}

#[tokio::test]
async fn out_of_range_coordinates_are_rejected() {
    let request = parse(r#"{"cropType": "rice", "coordinates": {"lat": -95.0, "lon": 10.0}}"#);
    let err = service_with_seed(1).recommend(&request).await.unwrap_err();
    assert!(err.to_string().contains("invalid coordinates"));
}

#[tokio::test]
async fn crop_analysis_feeds_the_engine() {
    let deficiency = |nutrient: Nutrient, severity| NutrientDeficiency {
        nutrient,
        severity,
        confidence: 0.9,
        symptoms: nutrient.symptoms().iter().map(|s| (*s).to_string()).collect(),
    };

    // one deficiency alone, even a severe one, still reads as good health
    let single = assess(vec![deficiency(Nutrient::Nitrogen, DeficiencySeverity::High)], 0.85);
    assert_eq!(single.crop_health, CropHealth::Good);

    let analysis = assess(
        vec![
            deficiency(Nutrient::Nitrogen, DeficiencySeverity::High),
            deficiency(Nutrient::Iron, DeficiencySeverity::Low),
        ],
        0.85,
    );
    assert_eq!(analysis.crop_health, CropHealth::Poor);

    let mut request = parse(r#"{"cropType": "rice", "region": "north_plains"}"#);
    let service = RecommendationService::new(
        RecommendationEngine::default(),
        Box::new(RegionalSoilCards::new()),
        Box::new(StaticWeatherProvider::new(WeatherSnapshot::default())),
    );
    let healthy = service.recommend(&request).await.unwrap();
    request.crop_analysis = Some(analysis);
    let stressed = service.recommend(&request).await.unwrap();

    // poor health raises nitrogen only
    assert!(stressed.recommendation.fertilizer.nitrogen > healthy.recommendation.fertilizer.nitrogen);
    assert_eq!(
        stressed.recommendation.fertilizer.phosphorus,
        healthy.recommendation.fertilizer.phosphorus
    );
}

#[tokio::test]
async fn mock_analyzer_output_is_a_valid_engine_input() {
    let analyzer = MockCropAnalyzer::seeded(11);
    let analysis = analyzer.analyze(b"\x89PNG").await.unwrap();

    let mut request = parse(r#"{"cropType": "millets", "region": "hills"}"#);
    request.crop_analysis = Some(analysis);
    let report = service_with_seed(11).recommend(&request).await.unwrap();
    assert!(report.recommendation.sustainability_score <= 100);
}

#[tokio::test]
async fn market_cost_uses_price_sheet() {
    let pricing = PricingConfig::default();
    let source: Box<dyn PriceSource> = Box::new(StaticPriceSource::new(pricing.clone()));
    let service = service_with_seed(3).with_prices(CachedPriceProvider::new(source, &pricing));

    let request = parse(
        r#"{
            "cropType": "wheat",
            "soilData": {"soilType": "loamy", "pH": 6.5, "nitrogen": 100,
                         "phosphorus": 20, "potassium": 100, "organicCarbon": 1.0},
            "weatherData": {"temperature": 25, "humidity": 50, "rainfall": 3, "windSpeed": 5}
        }"#,
    );
    let report = service.recommend(&request).await.unwrap();
    let cost = report.market_cost.unwrap();
    // 95 * 80 + 48 * 140 + 30 * 62
    assert_eq!(cost.total, 16_180);
    assert_eq!(cost.source, "indian-market-rates-2025");
}

#[tokio::test]
async fn providers_are_usable_as_trait_objects() {
    let weather: Box<dyn WeatherProvider> = Box::new(MockWeatherProvider::seeded(8));
    let cards: Box<dyn SoilCardProvider> = Box::new(RegionalSoilCards::with_variation(8));

    let w = weather.current(Some(Coordinates::new(12.9, 77.6))).await.unwrap();
    assert!(w.validate().is_ok());

    let card = cards.card_for_coordinates(Coordinates::new(12.9, 77.6)).await.unwrap();
    assert_eq!(card.card_number, "SHC-SP-2024-002");
    assert!(card.sample.validate().is_ok());
}

#[tokio::test]
async fn live_weather_outage_surfaces_as_collaborator_error() {
    let weather = OpenWeatherProvider::new("test-key")
        .unwrap()
        .with_base_url("http://127.0.0.1:1");
    let service = RecommendationService::new(
        RecommendationEngine::default(),
        Box::new(RegionalSoilCards::new()),
        Box::new(weather),
    );

    let request = parse(r#"{"cropType": "cotton", "region": "south_plains"}"#);
    let err = service.recommend(&request).await.unwrap_err();
    assert!(matches!(err, ServiceError::Provider(_)), "{err}");
    assert!(err.to_string().contains("openweathermap"));

    // supplied weather never touches the provider
    let request = parse(
        r#"{
            "cropType": "cotton", "region": "south_plains",
            "weatherData": {"temperature": 29, "humidity": 55, "rainfall": 0, "windSpeed": 8}
        }"#,
    );
    assert!(service.recommend(&request).await.is_ok());
}
