//! Vietnamese administrative region catalogue.
//!
//! Two binaries share this library: `vn-admin-crawler` ingests provinces and
//! administrative units from the national source into Postgres, and
//! `vn-admin-api` serves them over HTTP behind a Redis or in-process cache.

pub mod core;
pub mod features;
pub mod modules;
pub mod shared;
