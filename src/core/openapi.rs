use utoipa::{Modify, OpenApi};

use crate::features::regions::{dtos as regions_dtos, handlers as regions_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Probes
        regions_handlers::health,
        regions_handlers::ready,
        // Regions
        regions_handlers::list_provinces,
        regions_handlers::list_units_by_province,
        regions_handlers::search_units,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Probes
            regions_dtos::HealthResponseDto,
            regions_dtos::ReadinessResponseDto,
            ApiResponse<regions_dtos::HealthResponseDto>,
            ApiResponse<regions_dtos::ReadinessResponseDto>,
            // Regions
            regions_dtos::ProvinceResponseDto,
            regions_dtos::AdminUnitResponseDto,
            ApiResponse<Vec<regions_dtos::ProvinceResponseDto>>,
            ApiResponse<Vec<regions_dtos::AdminUnitResponseDto>>,
        )
    ),
    tags(
        (name = "health", description = "Liveness and readiness probes"),
        (name = "regions", description = "Vietnamese provinces and administrative units"),
    ),
    info(
        title = "VN Admin API",
        version = "0.1.0",
        description = "Vietnamese provinces and administrative units",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_read_api() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/health",
            "/ready",
            "/api/v1/provinces",
            "/api/v1/provinces/{id}/units",
            "/api/v1/search",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {}",
                expected
            );
        }
    }

    #[test]
    fn test_info_modifier_overrides_title() {
        let mut doc = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Regions".to_string(),
            version: "9.9.9".to_string(),
            description: "test".to_string(),
        }
        .modify(&mut doc);

        assert_eq!(doc.info.title, "Regions");
        assert_eq!(doc.info.version, "9.9.9");
    }
}
