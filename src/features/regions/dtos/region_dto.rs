use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::features::regions::models::{AdminUnit, Province};

/// Query parameters for unit search
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Name or pre-merger description fragment (case-insensitive, at least 2 characters)
    #[param(example = "ba dinh")]
    pub q: Option<String>,
}

/// Response DTO for province data
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProvinceResponseDto {
    pub id: i32,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
    pub updated_at: DateTime<Utc>,
}

impl From<Province> for ProvinceResponseDto {
    fn from(province: Province) -> Self {
        Self {
            id: province.id,
            name: province.name,
            code: province.code,
            updated_at: province.updated_at,
        }
    }
}

/// Response DTO for administrative unit data
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminUnitResponseDto {
    pub id: i32,
    pub province_id: i32,
    pub name: String,
    /// Unit type as published by the source (e.g. "phuong", "xa")
    pub level: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_merger_description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub updated_at: DateTime<Utc>,
}

impl From<AdminUnit> for AdminUnitResponseDto {
    fn from(unit: AdminUnit) -> Self {
        Self {
            id: unit.id,
            province_id: unit.province_id,
            name: unit.name,
            level: unit.level,
            code: unit.code,
            pre_merger_description: unit.pre_merger_description,
            latitude: unit.latitude,
            longitude: unit.longitude,
            updated_at: unit.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponseDto {
    pub status: String,
}

/// Readiness report. The cache is informational; only the database gates readiness.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReadinessResponseDto {
    pub status: String,
    pub database: String,
    pub cache: String,
}
