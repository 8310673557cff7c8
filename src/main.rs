//! soilwise - fertilizer recommendation command line
//!
//! # Usage
//!
//! ```bash
//! # Recommendation from a JSON request (file or stdin)
//! soilwise recommend --input request.json
//! echo '{"cropType":"wheat","region":"hills"}' | soilwise recommend --with-prices
//!
//! # Live weather from OpenWeatherMap instead of the mock
//! OPENWEATHER_API_KEY=... soilwise recommend --input request.json --live-weather
//!
//! # Quick single-product prediction from a soil test
//! echo '{"N":20,"P":35,"K":45,"pH":6.8,"cropType":"rice"}' | soilwise predict
//!
//! # Check an agronomy config for typos and bad values
//! soilwise check-config --path agronomy.toml
//!
//! # Write the built-in defaults as an editable file
//! soilwise init-config --path agronomy.toml
//!
//! # Reference data
//! soilwise prices
//! soilwise regions
//! ```
//!
//! # Environment Variables
//!
//! - `SOILWISE_CONFIG`: Path to an agronomy TOML file (default: ./agronomy.toml)
//! - `OPENWEATHER_API_KEY`: API key for `--live-weather`
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use soilwise::config::{self, validation, AgronomyConfig, ConfigError};
use soilwise::engine::quick_prediction::{quick_report, QuickPredictionInput};
use soilwise::providers::{
    CachedPriceProvider, MockWeatherProvider, OpenWeatherProvider, PriceSource, RegionalSoilCards,
    StaticPriceSource, WeatherProvider,
};
use soilwise::{RecommendationEngine, RecommendationRequest, RecommendationService};

/// CLI arguments
#[derive(Parser, Debug)]
#[command(name = "soilwise")]
#[command(about = "Fertilizer recommendations from soil, weather and crop health")]
#[command(version)]
struct CliArgs {
    /// Agronomy config file (overrides SOILWISE_CONFIG and ./agronomy.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute a recommendation for a JSON request
    Recommend {
        /// Request file, or "-" for stdin
        #[arg(long, short, default_value = "-")]
        input: String,
        /// Soil health card region, used when the request has no soil data
        #[arg(long)]
        region: Option<String>,
        /// Seed for the mock weather provider (reproducible output)
        #[arg(long, conflicts_with = "live_weather")]
        seed: Option<u64>,
        /// Fetch weather from OpenWeatherMap instead of the mock
        #[arg(long)]
        live_weather: bool,
        /// OpenWeatherMap API key
        #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
        openweather_key: Option<String>,
        /// Add a market cost breakdown from the price sheet
        #[arg(long)]
        with_prices: bool,
        /// Single-line JSON output
        #[arg(long)]
        compact: bool,
    },
    /// Quick single-product prediction for a JSON soil test
    Predict {
        /// Soil test file, or "-" for stdin
        #[arg(long, short, default_value = "-")]
        input: String,
        /// Single-line JSON output
        #[arg(long)]
        compact: bool,
    },
    /// Validate an agronomy config file
    CheckConfig {
        /// Config file (default: the normal search order)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Write the built-in defaults to a TOML file
    InitConfig {
        #[arg(long, default_value = config::defaults::CONFIG_FILE_NAME)]
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the current fertilizer price sheet
    Prices,
    /// List the regional soil health cards
    Regions,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    // Logs go to stderr so stdout stays valid JSON
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let logs = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if args.json_logs {
        logs.json().init();
    } else {
        logs.init();
    }

    match args.command {
        Command::CheckConfig { path } => check_config(path.or(args.config).as_deref()),
        Command::InitConfig { path, force } => init_config(&path, force),
        Command::Recommend {
            input,
            region,
            seed,
            live_weather,
            openweather_key,
            with_prices,
            compact,
        } => {
            init_agronomy(args.config.as_deref())?;
            let mut request = read_request(&input)?;
            if region.is_some() {
                request.region = region;
            }
            let weather = weather_provider(seed, live_weather, openweather_key.as_deref())?;
            recommend(&request, weather, with_prices, compact).await
        }
        Command::Predict { input, compact } => {
            let soil_test: QuickPredictionInput =
                serde_json::from_str(&read_input(&input)?).context("Input is not a valid soil test")?;
            soil_test.validate()?;
            let report = quick_report(&soil_test);
            info!(
                fertilizer = %report.prediction.fertilizer,
                amount = report.prediction.amount,
                confidence = report.confidence,
                "Quick prediction"
            );
            print_json(&report, compact)
        }
        Command::Prices => {
            init_agronomy(args.config.as_deref())?;
            let sheet = price_provider().current().await;
            print_json(&sheet, false)
        }
        Command::Regions => {
            let cards: Vec<_> = RegionalSoilCards::regions()
                .into_iter()
                .filter_map(|region| RegionalSoilCards::reference_card(region).map(|card| (region, card)))
                .map(|(region, card)| serde_json::json!({ "region": region, "card": card }))
                .collect();
            print_json(&cards, false)
        }
    }
}

/// Load the agronomy config (explicit file or search order) and install it globally.
fn init_agronomy(path: Option<&Path>) -> Result<()> {
    let agronomy = match path {
        Some(path) => AgronomyConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AgronomyConfig::load(),
    };
    info!(
        crops = agronomy.crops.len(),
        default_crop = %agronomy.recommendation.default_crop,
        "Agronomy config ready"
    );
    config::init(agronomy);
    Ok(())
}

fn weather_provider(seed: Option<u64>, live: bool, api_key: Option<&str>) -> Result<Box<dyn WeatherProvider>> {
    if live {
        let provider = match api_key {
            Some(key) => OpenWeatherProvider::new(key)?,
            None => OpenWeatherProvider::from_env()?,
        };
        info!("Using live OpenWeatherMap weather");
        return Ok(Box::new(provider));
    }
    Ok(match seed {
        Some(seed) => Box::new(MockWeatherProvider::seeded(seed)),
        None => Box::new(MockWeatherProvider::from_entropy()),
    })
}

async fn recommend(
    request: &RecommendationRequest,
    weather: Box<dyn WeatherProvider>,
    with_prices: bool,
    compact: bool,
) -> Result<()> {
    let mut service = RecommendationService::new(
        RecommendationEngine::from_global(),
        Box::new(RegionalSoilCards::new()),
        weather,
    );
    if with_prices {
        service = service.with_prices(price_provider());
    }

    let report = service
        .recommend(request)
        .await
        .with_context(|| format!("Recommendation failed for crop '{}'", request.crop_type))?;
    info!(
        crop = %report.crop_type,
        n = report.recommendation.fertilizer.nitrogen,
        p = report.recommendation.fertilizer.phosphorus,
        k = report.recommendation.fertilizer.potassium,
        score = report.recommendation.sustainability_score,
        "{}",
        report.sustainability_label
    );
    print_json(&report, compact)
}

fn price_provider() -> CachedPriceProvider<Box<dyn PriceSource>> {
    let pricing = &config::get().pricing;
    let source: Box<dyn PriceSource> = Box::new(StaticPriceSource::new(pricing.clone()));
    CachedPriceProvider::new(source, pricing)
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {input}"))
    }
}

fn read_request(input: &str) -> Result<RecommendationRequest> {
    serde_json::from_str(&read_input(input)?).context("Request is not a valid recommendation request")
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let text = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{text}");
    Ok(())
}

fn check_config(path: Option<&Path>) -> Result<()> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match std::env::var(config::defaults::CONFIG_ENV_VAR) {
            Ok(p) => PathBuf::from(p),
            Err(_) => PathBuf::from(config::defaults::CONFIG_FILE_NAME),
        },
    };

    let raw = std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    // from_toml_str logs each unknown key itself
    let warnings = validation::validate_unknown_keys(&raw).len();

    match AgronomyConfig::from_toml_str(&raw) {
        Ok(cfg) => {
            info!(
                path = %path.display(),
                crops = cfg.crops.len(),
                warnings,
                "Config OK"
            );
            Ok(())
        }
        Err(ConfigError::Validation(errors)) => {
            for e in &errors {
                error!("{}", e);
            }
            bail!("{} has {} validation error(s)", path.display(), errors.len())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to parse {}", path.display())),
    }
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    AgronomyConfig::default()
        .save_to_file(path)
        .with_context(|| format!("Failed to write {}", path.display()))
}
