//! Region cache with interchangeable backends
//!
//! Provides a Redis-backed cache shared between instances and an in-process
//! fallback with the same TTL semantics. The backend is chosen once at start-up;
//! callers only see `Arc<dyn RegionCache>`.

mod memory_cache;
mod redis_cache;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::config::CacheConfig;
use crate::features::regions::models::{AdminUnit, Province};

pub use memory_cache::MemoryRegionCache;
pub use redis_cache::RedisRegionCache;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(String),

    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Read-through cache for the region listings.
///
/// A `get_*` returns `Some` only for an unexpired, non-empty entry; anything
/// else is a miss. Errors from `set_*` are advisory and must not fail the
/// caller's request.
#[async_trait]
pub trait RegionCache: Send + Sync {
    async fn get_provinces(&self) -> Option<Vec<Province>>;

    async fn set_provinces(&self, provinces: &[Province]) -> Result<(), CacheError>;

    async fn get_units(&self, province_id: i32) -> Option<Vec<AdminUnit>>;

    async fn set_units(&self, province_id: i32, units: &[AdminUnit]) -> Result<(), CacheError>;

    async fn ping(&self) -> Result<(), CacheError>;
}

/// Picks the Redis backend when configured and reachable, the in-process cache otherwise
pub async fn connect_cache(config: &CacheConfig) -> Arc<dyn RegionCache> {
    let Some(url) = config.redis_url.as_deref() else {
        tracing::info!("Using in-memory cache (no REDIS_URL configured)");
        return Arc::new(MemoryRegionCache::new(config.ttl));
    };

    match RedisRegionCache::connect(url, config.ttl, config.connect_timeout).await {
        Ok(cache) => {
            tracing::info!("Redis cache connected");
            Arc::new(cache)
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Redis connection failed, falling back to memory cache"
            );
            Arc::new(MemoryRegionCache::new(config.ttl))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::shared::test_helpers::sample_province;

    fn config(redis_url: Option<&str>) -> CacheConfig {
        CacheConfig {
            redis_url: redis_url.map(str::to_string),
            ttl: Duration::from_secs(60),
            connect_timeout: Duration::from_millis(500),
        }
    }

    #[tokio::test]
    async fn test_connect_cache_without_redis_uses_memory() {
        let cache = connect_cache(&config(None)).await;

        assert!(cache.ping().await.is_ok());
        assert!(cache.get_provinces().await.is_none());
    }

    #[tokio::test]
    async fn test_connect_cache_falls_back_when_redis_url_is_invalid() {
        let cache = connect_cache(&config(Some("not-a-redis-url"))).await;

        let provinces = vec![sample_province(1, "A")];
        cache.set_provinces(&provinces).await.unwrap();
        assert_eq!(cache.get_provinces().await, Some(provinces));
        assert!(cache.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_connect_cache_falls_back_when_redis_is_unreachable() {
        // Nothing listens on port 1
        let cache = connect_cache(&config(Some("redis://127.0.0.1:1"))).await;

        let provinces = vec![sample_province(7, "Ha Noi")];
        cache.set_provinces(&provinces).await.unwrap();
        assert_eq!(cache.get_provinces().await, Some(provinces));
    }
}
