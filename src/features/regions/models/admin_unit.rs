use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Administrative unit (ward/commune) belonging to exactly one province
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct AdminUnit {
    pub id: i32,
    pub province_id: i32,
    pub name: String,
    pub level: String,
    /// Kept as text, codes carry leading zeros
    pub code: String,
    pub pre_merger_description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub updated_at: DateTime<Utc>,
}

/// Write-side unit record; `updated_at` is assigned by the store
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertAdminUnit {
    pub id: i32,
    pub province_id: i32,
    pub name: String,
    pub level: String,
    pub code: String,
    pub pre_merger_description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}
