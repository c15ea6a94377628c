//! Catalog pipeline
//!
//! Cache miss → aggregate all sources → verify streams → store snapshot.
//! Concurrent misses share a single refresh; while it runs, readers get the
//! previous snapshot if there is one.

use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::Instrument;

use crate::config::Config;
use crate::models::CachedCatalog;
use crate::services::aggregator::ChannelAggregator;
use crate::services::cache::CatalogCache;
use crate::services::metrics;
use crate::services::prober::{HttpProber, Prober};
use crate::services::verifier::{ChannelVerifier, VerifySettings};

/// Pipeline failures visible to callers
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("no playlist sources configured")]
    NoSources,
    #[error("all {attempted} playlist sources failed")]
    AllSourcesFailed { attempted: usize },
}

/// Catalog returned to the read endpoint
#[derive(Debug, Clone)]
pub struct CatalogLookup {
    pub catalog: Arc<CachedCatalog>,
    /// Served from cache without running the pipeline
    pub cached: bool,
}

pub struct CatalogService {
    sources: Vec<String>,
    aggregator: ChannelAggregator,
    verifier: ChannelVerifier,
    cache: CatalogCache,
    refresh_guard: Mutex<()>,
}

impl CatalogService {
    pub fn new(
        sources: Vec<String>,
        aggregator: ChannelAggregator,
        verifier: ChannelVerifier,
        cache: CatalogCache,
    ) -> Self {
        Self {
            sources,
            aggregator,
            verifier,
            cache,
            refresh_guard: Mutex::new(()),
        }
    }

    /// Wire the production pipeline from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let aggregator = ChannelAggregator::new(
            &config.user_agent,
            config.fetch_timeout_ms,
            config.max_catalog_channels,
        )?;
        let prober: Arc<dyn Prober> =
            Arc::new(HttpProber::new(&config.user_agent, config.probe_timeout_ms)?);
        let verifier = ChannelVerifier::new(prober, VerifySettings::from_config(config));
        let cache = CatalogCache::new(Duration::from_millis(config.catalog_cache_ttl_ms));

        Ok(Self::new(config.sources.clone(), aggregator, verifier, cache))
    }

    pub fn cache(&self) -> &CatalogCache {
        &self.cache
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Cached catalog, or a fresh one when the cache has expired
    pub async fn get_catalog(&self) -> Result<CatalogLookup, CatalogError> {
        if let Some(catalog) = self.cache.get().await {
            metrics::record_cache_lookup(true);
            return Ok(CatalogLookup {
                catalog,
                cached: true,
            });
        }
        metrics::record_cache_lookup(false);

        let _guard = match self.refresh_guard.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                // Refresh in flight: serve the expired snapshot instead of waiting
                if let Some(catalog) = self.cache.latest().await {
                    return Ok(CatalogLookup {
                        catalog,
                        cached: true,
                    });
                }
                self.refresh_guard.lock().await
            }
        };

        // Another request may have refreshed while we waited
        if let Some(catalog) = self.cache.get().await {
            return Ok(CatalogLookup {
                catalog,
                cached: true,
            });
        }

        let catalog = self.refresh().await?;
        Ok(CatalogLookup {
            catalog,
            cached: false,
        })
    }

    /// Run the whole pipeline and store the result
    pub async fn refresh(&self) -> Result<Arc<CachedCatalog>, CatalogError> {
        let refresh_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("catalog_refresh", %refresh_id);

        let result = self.run_pipeline().instrument(span).await;
        metrics::record_refresh(result.is_ok());

        let catalog = Arc::new(result?);
        metrics::set_catalog_size(catalog.entries.len());
        self.cache.set(catalog.clone()).await;
        tracing::debug!("Catalog cached for {:?}", self.cache.ttl());
        Ok(catalog)
    }

    async fn run_pipeline(&self) -> Result<CachedCatalog, CatalogError> {
        if self.sources.is_empty() {
            return Err(CatalogError::NoSources);
        }

        let started = Instant::now();
        tracing::info!("Refreshing catalog from {} sources", self.sources.len());

        let outcome = self.aggregator.aggregate(&self.sources).await;
        if outcome.sources_ok == 0 {
            tracing::error!("Every playlist source failed");
            return Err(CatalogError::AllSourcesFailed {
                attempted: self.sources.len(),
            });
        }

        let verified = self.verifier.verify(outcome.channels).await;

        tracing::info!(
            "Catalog refreshed: {} channels in {:.1}s",
            verified.len(),
            started.elapsed().as_secs_f64()
        );

        Ok(CachedCatalog::new(verified))
    }
}
