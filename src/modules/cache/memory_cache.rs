use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use super::{CacheError, RegionCache};
use crate::features::regions::models::{AdminUnit, Province};

/// Cached list with its absolute expiry
struct CachedList<T> {
    data: Vec<T>,
    expires_at: Instant,
}

impl<T: Clone> CachedList<T> {
    fn new(data: Vec<T>, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Instant::now() + ttl,
        }
    }

    /// Expired or empty entries are treated as absent
    fn fresh(&self) -> Option<Vec<T>> {
        if Instant::now() < self.expires_at && !self.data.is_empty() {
            Some(self.data.clone())
        } else {
            None
        }
    }
}

/// In-process cache used when Redis is not available.
///
/// The province entry and the per-province unit map sit behind separate locks
/// so unit traffic never blocks province reads and vice versa.
pub struct MemoryRegionCache {
    provinces: RwLock<Option<CachedList<Province>>>,
    units: RwLock<HashMap<i32, CachedList<AdminUnit>>>,
    ttl: Duration,
}

impl MemoryRegionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            provinces: RwLock::new(None),
            units: RwLock::new(HashMap::new()),
            ttl,
        }
    }
}

#[async_trait]
impl RegionCache for MemoryRegionCache {
    async fn get_provinces(&self) -> Option<Vec<Province>> {
        let cache = self.provinces.read().await;
        cache.as_ref().and_then(CachedList::fresh)
    }

    async fn set_provinces(&self, provinces: &[Province]) -> Result<(), CacheError> {
        let mut cache = self.provinces.write().await;
        *cache = Some(CachedList::new(provinces.to_vec(), self.ttl));
        Ok(())
    }

    async fn get_units(&self, province_id: i32) -> Option<Vec<AdminUnit>> {
        let cache = self.units.read().await;
        cache.get(&province_id).and_then(CachedList::fresh)
    }

    async fn set_units(&self, province_id: i32, units: &[AdminUnit]) -> Result<(), CacheError> {
        let mut cache = self.units.write().await;
        cache.insert(province_id, CachedList::new(units.to_vec(), self.ttl));
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }
}
