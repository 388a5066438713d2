use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Province model representing a top-level Vietnamese region (tinh/thanh pho)
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Province {
    pub id: i32,
    pub name: String,
    pub code: Option<i32>,
    pub updated_at: DateTime<Utc>,
}

/// Write-side province record; `updated_at` is assigned by the store
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertProvince {
    pub id: i32,
    pub name: String,
    pub code: Option<i32>,
}
