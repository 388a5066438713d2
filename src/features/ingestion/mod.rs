//! Ingestion of the national administrative catalogue.
//!
//! The remote source is queried for the province list, then for the units of
//! each province in turn. Every row is upserted into the region store. A
//! failure on one province or unit is logged and the run carries on; only a
//! failure to obtain the province list aborts it.

pub mod clients;
pub mod workers;

pub use clients::{HttpRegionSource, RegionSource, SourceError};
pub use workers::{IngestionPipeline, IngestionSummary, PipelineError};
