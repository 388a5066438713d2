use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::regions::dtos::ReadinessResponseDto;
use crate::features::regions::models::{AdminUnit, Province};
use crate::features::regions::store::RegionStore;
use crate::modules::cache::RegionCache;
use crate::shared::constants::{MIN_SEARCH_LEN, SEARCH_LIMIT};

/// Read side of the region catalogue: store lookups behind the region cache
pub struct RegionService {
    store: Arc<dyn RegionStore>,
    cache: Arc<dyn RegionCache>,
}

impl RegionService {
    pub fn new(store: Arc<dyn RegionStore>, cache: Arc<dyn RegionCache>) -> Self {
        Self { store, cache }
    }

    /// List all provinces, served from cache when fresh
    pub async fn list_provinces(&self) -> Result<Vec<Province>> {
        if let Some(provinces) = self.cache.get_provinces().await {
            return Ok(provinces);
        }

        let provinces = self.store.list_provinces().await.map_err(|e| {
            tracing::error!("Failed to fetch provinces: {:?}", e);
            AppError::Store(e)
        })?;

        if let Err(e) = self.cache.set_provinces(&provinces).await {
            tracing::warn!(error = %e, "Failed to cache provinces");
        }

        Ok(provinces)
    }

    /// List the units of one province, served from cache when fresh
    pub async fn list_units(&self, province_id: i32) -> Result<Vec<AdminUnit>> {
        if let Some(units) = self.cache.get_units(province_id).await {
            return Ok(units);
        }

        let units = self
            .store
            .list_units_by_province(province_id)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to fetch units for province {}: {:?}",
                    province_id,
                    e
                );
                AppError::Store(e)
            })?;

        if let Err(e) = self.cache.set_units(province_id, &units).await {
            tracing::warn!(province_id, error = %e, "Failed to cache units");
        }

        Ok(units)
    }

    /// Search units by name or pre-merger description. Never cached.
    pub async fn search_units(&self, term: &str) -> Result<Vec<AdminUnit>> {
        let term = term.trim();
        if term.chars().count() < MIN_SEARCH_LEN {
            return Err(AppError::BadRequest(format!(
                "Query too short (min {} chars)",
                MIN_SEARCH_LEN
            )));
        }

        self.store
            .search_units(term, SEARCH_LIMIT)
            .await
            .map_err(|e| {
                tracing::error!("Failed to search units for '{}': {:?}", term, e);
                AppError::Store(e)
            })
    }

    /// Database reachability gates readiness; cache health is only reported
    pub async fn readiness(&self) -> Result<ReadinessResponseDto> {
        if let Err(e) = self.store.ping().await {
            tracing::error!("Readiness check failed: {:?}", e);
            return Err(AppError::ServiceUnavailable(
                "Database is not reachable".to_string(),
            ));
        }

        let cache = match self.cache.ping().await {
            Ok(()) => "ok",
            Err(e) => {
                tracing::warn!(error = %e, "Cache ping failed");
                "degraded"
            }
        };

        Ok(ReadinessResponseDto {
            status: "ready".to_string(),
            database: "ok".to_string(),
            cache: cache.to_string(),
        })
    }
}
