use std::process::ExitCode;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vn_admin_api::core::config::CrawlerConfig;
use vn_admin_api::core::database;
use vn_admin_api::features::ingestion::{HttpRegionSource, IngestionPipeline, PipelineError};
use vn_admin_api::features::regions::PgRegionStore;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CrawlerConfig::from_env().map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!("Configuration loaded successfully");

    let pool = database::create_pool(&config.database).await?;
    database::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database ready");

    let source = Arc::new(
        HttpRegionSource::new(config.source.clone())
            .map_err(|e| anyhow::anyhow!("Failed to build source client: {}", e))?,
    );
    let store = Arc::new(PgRegionStore::new(pool.clone()));
    let pipeline = IngestionPipeline::new(source, store, &config.ingestion);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current province");
            trigger.cancel();
        }
    });

    let outcome = pipeline.run(&cancel).await;
    pool.close().await;

    match outcome {
        Ok(summary) => {
            tracing::info!(
                provinces = summary.provinces_upserted,
                provinces_failed = summary.provinces_failed,
                unit_fetches_failed = summary.unit_fetches_failed,
                units = summary.units_upserted,
                units_failed = summary.units_failed,
                "Crawler finished"
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(PipelineError::Cancelled) => {
            tracing::warn!("Crawler cancelled, rows written so far are kept");
            Ok(ExitCode::from(130))
        }
        Err(e @ PipelineError::ProvinceList(_)) => {
            tracing::error!("Crawler failed: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}
