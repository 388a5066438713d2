use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::core::config::IngestionConfig;
use crate::features::ingestion::clients::{RegionSource, SourceError};
use crate::features::regions::models::{UpsertAdminUnit, UpsertProvince};
use crate::features::regions::store::RegionStore;
use crate::shared::retry::{retry, RetryError, RetryPolicy};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to fetch provinces: {0}")]
    ProvinceList(#[source] RetryError<SourceError>),

    #[error("Ingestion cancelled")]
    Cancelled,
}

/// Counts for one run. Per-entity failures only surface here and in the logs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestionSummary {
    pub provinces_upserted: usize,
    pub provinces_failed: usize,
    pub unit_fetches_failed: usize,
    pub units_upserted: usize,
    pub units_failed: usize,
}

/// Copies the remote dataset into the store, one province at a time.
///
/// Every write is a keyed upsert, so a run can be repeated or resumed after a
/// partial failure without producing duplicates.
pub struct IngestionPipeline {
    source: Arc<dyn RegionSource>,
    store: Arc<dyn RegionStore>,
    retry_policy: RetryPolicy,
    politeness_delay: Duration,
}

impl IngestionPipeline {
    pub fn new(
        source: Arc<dyn RegionSource>,
        store: Arc<dyn RegionStore>,
        config: &IngestionConfig,
    ) -> Self {
        Self {
            source,
            store,
            retry_policy: RetryPolicy::new(config.max_attempts, config.retry_base_delay),
            politeness_delay: config.politeness_delay,
        }
    }

    pub async fn run(&self, cancel: &CancellationToken) -> Result<IngestionSummary, PipelineError> {
        tracing::info!("Starting ingestion run");

        let provinces = retry(&self.retry_policy, cancel, || self.source.fetch_provinces())
            .await
            .map_err(|e| match e {
                RetryError::Cancelled => PipelineError::Cancelled,
                exhausted => PipelineError::ProvinceList(exhausted),
            })?;
        tracing::info!("Found {} provinces", provinces.len());

        let mut summary = IngestionSummary::default();
        let total = provinces.len();

        for (index, province) in provinces.iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::warn!(
                    "Ingestion cancelled after {} of {} provinces",
                    index,
                    total
                );
                return Err(PipelineError::Cancelled);
            }

            let fetched_units = self.ingest_province(province, cancel, &mut summary).await?;

            let is_last = index + 1 == total;
            if fetched_units && !is_last && !self.politeness_delay.is_zero() {
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = tokio::time::sleep(self.politeness_delay) => {}
                }
            }
        }

        tracing::info!(
            "Ingestion finished: {} provinces ({} failed), {} units ({} failed), {} unit fetches failed",
            summary.provinces_upserted,
            summary.provinces_failed,
            summary.units_upserted,
            summary.units_failed,
            summary.unit_fetches_failed
        );

        Ok(summary)
    }

    /// Upserts one province and its units. Returns whether the unit fetch succeeded.
    async fn ingest_province(
        &self,
        province: &UpsertProvince,
        cancel: &CancellationToken,
        summary: &mut IngestionSummary,
    ) -> Result<bool, PipelineError> {
        tracing::info!("Processing province {} (id={})", province.name, province.id);

        if let Err(e) = self.store.upsert_province(province).await {
            tracing::error!("Failed to upsert province {}: {}", province.id, e);
            summary.provinces_failed += 1;
            return Ok(false);
        }
        summary.provinces_upserted += 1;

        let units = match retry(&self.retry_policy, cancel, || {
            self.source.fetch_units(province.id)
        })
        .await
        {
            Ok(units) => units,
            Err(RetryError::Cancelled) => return Err(PipelineError::Cancelled),
            Err(e) => {
                tracing::error!("Failed to fetch units for province {}: {}", province.id, e);
                summary.unit_fetches_failed += 1;
                return Ok(false);
            }
        };
        tracing::info!("Found {} units for province {}", units.len(), province.id);

        self.persist_units(&units, summary).await;
        Ok(true)
    }

    /// A failed unit is logged and skipped; the rest of the batch still goes in
    async fn persist_units(&self, units: &[UpsertAdminUnit], summary: &mut IngestionSummary) {
        for unit in units {
            match self.store.upsert_unit(unit).await {
                Ok(()) => summary.units_upserted += 1,
                Err(e) => {
                    tracing::error!("Failed to upsert unit {}: {}", unit.id, e);
                    summary.units_failed += 1;
                }
            }
        }
    }
}
