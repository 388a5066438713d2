//! Vietnamese administrative regions feature.
//!
//! Read API over the post-merger catalogue: provinces and the administrative
//! units (wards and communes) that belong to them. Data is written by the
//! ingestion pipeline through [`store::RegionStore`] and read back through
//! [`RegionService`], which fronts the store with the region cache.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/health` | Liveness probe |
//! | GET | `/ready` | Readiness probe (database ping) |
//! | GET | `/api/v1/provinces` | List all provinces |
//! | GET | `/api/v1/provinces/{id}/units` | List units in a province |
//! | GET | `/api/v1/search?q=` | Search units by name (min 2 chars, max 50 results) |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

pub use services::RegionService;
pub use store::{PgRegionStore, RegionStore, StoreError};
