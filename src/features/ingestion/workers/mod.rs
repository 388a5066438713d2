mod ingestion_pipeline;

pub use ingestion_pipeline::{IngestionPipeline, IngestionSummary, PipelineError};
