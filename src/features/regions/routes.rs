use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::regions::handlers;
use crate::features::regions::services::RegionService;

/// Create routes for the regions feature, probes included
pub fn routes(service: Arc<RegionService>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/ready", get(handlers::ready))
        .route("/api/v1/provinces", get(handlers::list_provinces))
        .route(
            "/api/v1/provinces/{id}/units",
            get(handlers::list_units_by_province),
        )
        .route("/api/v1/search", get(handlers::search_units))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::Value;

    use crate::features::regions::store::RegionStore;
    use crate::modules::cache::MemoryRegionCache;
    use crate::shared::test_helpers::{upsert_province, upsert_unit, InMemoryRegionStore};

    async fn server() -> (TestServer, Arc<InMemoryRegionStore>) {
        let store = Arc::new(InMemoryRegionStore::new());
        store.upsert_province(&upsert_province(1, "Ha Noi")).await.unwrap();
        store.upsert_province(&upsert_province(2, "Hue")).await.unwrap();
        store.upsert_unit(&upsert_unit(10, 1, "Ba Dinh")).await.unwrap();
        store.upsert_unit(&upsert_unit(11, 1, "Hoan Kiem")).await.unwrap();

        let cache = Arc::new(MemoryRegionCache::new(Duration::from_secs(300)));
        let service = Arc::new(RegionService::new(store.clone(), cache));
        let server = TestServer::new(routes(service)).unwrap();
        (server, store)
    }

    #[tokio::test]
    async fn test_health() {
        let (server, _) = server().await;

        let response = server.get("/health").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["status"], "ok");
    }

    #[tokio::test]
    async fn test_ready_and_not_ready() {
        let (server, store) = server().await;

        server.get("/ready").await.assert_status_ok();

        store.fail_ping();
        let response = server.get("/ready").await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_list_provinces() {
        let (server, _) = server().await;

        let response = server.get("/api/v1/provinces").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["meta"]["total"], 2);
        assert_eq!(body["data"][0]["name"], "Ha Noi");
        assert_eq!(body["data"][1]["id"], 2);
    }

    #[tokio::test]
    async fn test_list_units_by_province() {
        let (server, _) = server().await;

        let response = server.get("/api/v1/provinces/1/units").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["meta"]["total"], 2);
        assert_eq!(body["data"][0]["provinceId"], 1);
        assert_eq!(body["data"][1]["name"], "Hoan Kiem");
    }

    #[tokio::test]
    async fn test_units_of_unknown_province_are_empty() {
        let (server, _) = server().await;

        let response = server.get("/api/v1/provinces/99/units").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_non_numeric_province_id_is_rejected() {
        let (server, _) = server().await;

        let response = server.get("/api/v1/provinces/abc/units").await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["message"], "Invalid Province ID");
    }

    #[tokio::test]
    async fn test_search() {
        let (server, _) = server().await;

        let response = server
            .get("/api/v1/search")
            .add_query_param("q", "kiem")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["meta"]["total"], 1);
        assert_eq!(body["data"][0]["id"], 11);
    }

    #[tokio::test]
    async fn test_search_requires_two_characters() {
        let (server, _) = server().await;

        server
            .get("/api/v1/search")
            .add_query_param("q", "k")
            .await
            .assert_status_bad_request();
        server.get("/api/v1/search").await.assert_status_bad_request();
    }
}
