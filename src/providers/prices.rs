//! Fertilizer market prices
//!
//! `CachedPriceProvider` wraps any `PriceSource` with a TTL cache:
//! - fresh cache → served without fetching
//! - fetch failure with a cached sheet → stale sheet served
//! - fetch failure with no cache → built-in sheet tagged `default-fallback`

use async_trait::async_trait;
use chrono::Utc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::ProviderError;
use crate::config::defaults::FALLBACK_PRICE_SOURCE;
use crate::config::PricingConfig;
use crate::types::PriceSheet;

/// Upstream of price sheets.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch(&self) -> Result<PriceSheet, ProviderError>;
}

#[async_trait]
impl PriceSource for Box<dyn PriceSource> {
    async fn fetch(&self) -> Result<PriceSheet, ProviderError> {
        (**self).fetch().await
    }
}

// ============================================================================
// Static Source
// ============================================================================

/// Prices from configuration, stamped with the time of each fetch.
#[derive(Debug, Clone, Default)]
pub struct StaticPriceSource {
    pricing: PricingConfig,
}

impl StaticPriceSource {
    pub fn new(pricing: PricingConfig) -> Self {
        Self { pricing }
    }

    fn sheet(&self, source: &str) -> PriceSheet {
        PriceSheet {
            nitrogen: self.pricing.nitrogen_per_kg,
            phosphorus: self.pricing.phosphorus_per_kg,
            potassium: self.pricing.potassium_per_kg,
            organic: self.pricing.organic_per_ha,
            last_updated: Utc::now(),
            source: source.to_string(),
        }
    }
}

#[async_trait]
impl PriceSource for StaticPriceSource {
    async fn fetch(&self) -> Result<PriceSheet, ProviderError> {
        Ok(self.sheet(&self.pricing.source))
    }
}

// ============================================================================
// Cached Provider
// ============================================================================

struct CachedSheet {
    sheet: PriceSheet,
    fetched_at: Instant,
}

pub struct CachedPriceProvider<S: PriceSource> {
    source: S,
    fallback: StaticPriceSource,
    ttl: Duration,
    cache: RwLock<Option<CachedSheet>>,
}

impl<S: PriceSource> CachedPriceProvider<S> {
    /// `pricing` supplies the fallback sheet and the cache TTL.
    pub fn new(source: S, pricing: &PricingConfig) -> Self {
        Self::with_ttl(source, pricing, Duration::from_secs(pricing.cache_ttl_secs))
    }

    pub fn with_ttl(source: S, pricing: &PricingConfig, ttl: Duration) -> Self {
        Self {
            source,
            fallback: StaticPriceSource::new(pricing.clone()),
            ttl,
            cache: RwLock::new(None),
        }
    }

    /// Current price sheet. Never fails.
    pub async fn current(&self) -> PriceSheet {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.fetched_at.elapsed() < self.ttl {
                    debug!(source = %cached.sheet.source, "Price sheet served from cache");
                    return cached.sheet.clone();
                }
            }
        }

        match self.source.fetch().await {
            Ok(sheet) => {
                info!(source = %sheet.source, "Price sheet refreshed");
                let mut cache = self.cache.write().await;
                *cache = Some(CachedSheet {
                    sheet: sheet.clone(),
                    fetched_at: Instant::now(),
                });
                sheet
            }
            Err(e) => {
                let cache = self.cache.read().await;
                if let Some(cached) = cache.as_ref() {
                    warn!(error = %e, "Price fetch failed, serving stale sheet");
                    cached.sheet.clone()
                } else {
                    warn!(error = %e, "Price fetch failed and nothing cached, using default sheet");
                    self.fallback.sheet(FALLBACK_PRICE_SOURCE)
                }
            }
        }
    }

    /// Drop the cached sheet so the next call fetches.
    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
    }
}
