pub mod ingestion;
pub mod regions;
