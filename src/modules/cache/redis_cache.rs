use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{CacheError, RegionCache};
use crate::features::regions::models::{AdminUnit, Province};

const PROVINCES_KEY: &str = "provinces";

fn units_key(province_id: i32) -> String {
    format!("units:{}", province_id)
}

/// Decodes a stored JSON list. Absent, undecodable and empty payloads are misses.
fn decode_entry<T: DeserializeOwned>(key: &str, data: Option<Vec<u8>>) -> Option<Vec<T>> {
    let items: Vec<T> = match serde_json::from_slice(&data?) {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "Discarding undecodable cache entry");
            return None;
        }
    };

    if items.is_empty() {
        None
    } else {
        tracing::debug!(key = %key, "cache hit");
        Some(items)
    }
}

/// Redis-backed cache. Entries are JSON and expire through `SET ... EX`.
pub struct RedisRegionCache {
    conn: ConnectionManager,
    ttl_secs: u64,
}

impl RedisRegionCache {
    /// Connects and verifies the server answers `PING` within `timeout`
    pub async fn connect(url: &str, ttl: Duration, timeout: Duration) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)
            .map_err(|e| CacheError::Backend(format!("invalid redis url: {}", e)))?;

        let conn = tokio::time::timeout(timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| CacheError::Backend("redis connection timed out".to_string()))?
            .map_err(|e| CacheError::Backend(format!("redis connection failed: {}", e)))?;

        let cache = Self {
            conn,
            // Redis rejects EX 0
            ttl_secs: ttl.as_secs().max(1),
        };

        tokio::time::timeout(timeout, cache.ping())
            .await
            .map_err(|_| CacheError::Backend("redis ping timed out".to_string()))??;

        Ok(cache)
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Option<Vec<T>> {
        let mut conn = self.conn.clone();
        let data: Option<Vec<u8>> = match conn.get(key).await {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Redis GET error");
                return None;
            }
        };

        decode_entry(key, data)
    }

    async fn write<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), CacheError> {
        let payload = serde_json::to_vec(items)?;
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(key, payload, self.ttl_secs)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;

        tracing::debug!(key = %key, ttl_secs = self.ttl_secs, "cache set");
        Ok(())
    }
}

#[async_trait]
impl RegionCache for RedisRegionCache {
    async fn get_provinces(&self) -> Option<Vec<Province>> {
        self.read(PROVINCES_KEY).await
    }

    async fn set_provinces(&self, provinces: &[Province]) -> Result<(), CacheError> {
        self.write(PROVINCES_KEY, provinces).await
    }

    async fn get_units(&self, province_id: i32) -> Option<Vec<AdminUnit>> {
        self.read(&units_key(province_id)).await
    }

    async fn set_units(&self, province_id: i32, units: &[AdminUnit]) -> Result<(), CacheError> {
        self.write(&units_key(province_id), units).await
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(())
    }
}
