pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod openapi;
pub mod rate_limit;
pub mod shutdown;
