use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::core::error::{AppError, Result};
use crate::features::regions::dtos::{
    AdminUnitResponseDto, HealthResponseDto, ProvinceResponseDto, ReadinessResponseDto,
    SearchQuery,
};
use crate::features::regions::services::RegionService;
use crate::shared::types::{ApiResponse, Meta};

// ==================== Probes ====================

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Process is alive", body = ApiResponse<HealthResponseDto>)
    ),
    tag = "health"
)]
pub async fn health() -> Json<ApiResponse<HealthResponseDto>> {
    Json(ApiResponse::success(
        Some(HealthResponseDto {
            status: "ok".to_string(),
        }),
        None,
        None,
    ))
}

/// Readiness probe
#[utoipa::path(
    get,
    path = "/ready",
    responses(
        (status = 200, description = "Database reachable", body = ApiResponse<ReadinessResponseDto>),
        (status = 503, description = "Database not reachable")
    ),
    tag = "health"
)]
pub async fn ready(
    State(service): State<Arc<RegionService>>,
) -> Result<Json<ApiResponse<ReadinessResponseDto>>> {
    let report = service.readiness().await?;
    Ok(Json(ApiResponse::success(Some(report), None, None)))
}

// ==================== Region Handlers ====================

/// List all provinces
#[utoipa::path(
    get,
    path = "/api/v1/provinces",
    responses(
        (status = 200, description = "List of provinces", body = ApiResponse<Vec<ProvinceResponseDto>>)
    ),
    tag = "regions"
)]
pub async fn list_provinces(
    State(service): State<Arc<RegionService>>,
) -> Result<Json<ApiResponse<Vec<ProvinceResponseDto>>>> {
    let provinces = service.list_provinces().await?;
    let meta = Meta::total_of(&provinces);
    let dtos: Vec<ProvinceResponseDto> = provinces.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, Some(meta))))
}

/// List administrative units of a province
#[utoipa::path(
    get,
    path = "/api/v1/provinces/{id}/units",
    params(
        ("id" = i32, Path, description = "Province id")
    ),
    responses(
        (status = 200, description = "Units in the province", body = ApiResponse<Vec<AdminUnitResponseDto>>),
        (status = 400, description = "Invalid province id")
    ),
    tag = "regions"
)]
pub async fn list_units_by_province(
    State(service): State<Arc<RegionService>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<AdminUnitResponseDto>>>> {
    let province_id: i32 = id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid Province ID".to_string()))?;

    let units = service.list_units(province_id).await?;
    let meta = Meta::total_of(&units);
    let dtos: Vec<AdminUnitResponseDto> = units.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, Some(meta))))
}

/// Search units by name or pre-merger description
#[utoipa::path(
    get,
    path = "/api/v1/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching units (at most 50)", body = ApiResponse<Vec<AdminUnitResponseDto>>),
        (status = 400, description = "Query too short")
    ),
    tag = "regions"
)]
pub async fn search_units(
    State(service): State<Arc<RegionService>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<AdminUnitResponseDto>>>> {
    let units = service
        .search_units(query.q.as_deref().unwrap_or_default())
        .await?;
    let meta = Meta::total_of(&units);
    let dtos: Vec<AdminUnitResponseDto> = units.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, Some(meta))))
}
