use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::models::CachedCatalog;

/// Snapshot plus the monotonic instant it was stored
#[derive(Debug, Clone)]
struct CacheSlot {
    catalog: Arc<CachedCatalog>,
    stored_at: Instant,
}

/// Cache introspection for the health endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheInfo {
    pub age_ms: u64,
    pub remaining_ms: u64,
    pub expired: bool,
    /// `fetchedAt` of the cached catalog, epoch milliseconds
    pub timestamp: i64,
    pub channels: usize,
}

/// Single-slot, TTL-bound cache for the verified catalog
///
/// The slot is replaced wholesale by `set`; readers clone the `Arc` and never
/// observe a partially written catalog.
pub struct CatalogCache {
    slot: RwLock<Option<CacheSlot>>,
    ttl: Duration,
}

impl CatalogCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: RwLock::new(None),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached catalog if it was stored within the TTL window
    pub async fn get(&self) -> Option<Arc<CachedCatalog>> {
        let slot = self.slot.read().await;
        slot.as_ref()
            .filter(|s| s.stored_at.elapsed() < self.ttl)
            .map(|s| s.catalog.clone())
    }

    /// Last stored catalog, even past its TTL
    pub async fn latest(&self) -> Option<Arc<CachedCatalog>> {
        self.slot.read().await.as_ref().map(|s| s.catalog.clone())
    }

    /// Replace the cached catalog
    pub async fn set(&self, catalog: Arc<CachedCatalog>) {
        let fresh = CacheSlot {
            catalog,
            stored_at: Instant::now(),
        };
        *self.slot.write().await = Some(fresh);
    }

    /// Age and freshness of the cached catalog, if any
    pub async fn info(&self) -> Option<CacheInfo> {
        let slot = self.slot.read().await;
        let s = slot.as_ref()?;

        let age = s.stored_at.elapsed();
        Some(CacheInfo {
            age_ms: age.as_millis() as u64,
            remaining_ms: self.ttl.saturating_sub(age).as_millis() as u64,
            expired: age >= self.ttl,
            timestamp: s.catalog.fetched_at.timestamp_millis(),
            channels: s.catalog.entries.len(),
        })
    }
}
