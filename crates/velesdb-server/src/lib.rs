//! # `velesdb-server`
//!
//! Axum-based JSON/HTTP surface over [`velesdb_core`]: collection admin,
//! vector CRUD and search, and the tenant routing layer that maps
//! `(tenant, namespace)` URLs onto synthetic collection names.

mod error;
mod handlers;
mod metric;
mod state;
mod types;

pub use error::{ApiError, ErrorBody};
pub use handlers::{
    batch_insert, batch_search, collection_count, collection_stats, create_collection,
    create_faq, create_faq_bulk, create_namespace, delete_collection, delete_faq, delete_vector,
    get_faq, get_vector, health_check, insert, list_collections, list_namespaces,
    namespace_stats, save, save_all, search, search_namespace, search_tenant,
    search_with_filter, tenant_stats, update_faq, update_vector,
};
pub use state::AppState;
pub use types::*;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// spec.md §4.4: request bodies up to at least 500 MiB (batched vector uploads).
const MAX_BODY_BYTES: usize = 500 * 1024 * 1024;

/// Builds the complete axum [`Router`] for the service: collection admin,
/// vector operations, and the tenant routing layer, all sharing one
/// [`AppState`].
///
/// Every response carries `Content-Type: application/json` (via `Json<T>`)
/// and `Access-Control-Allow-Origin: *` (via the permissive [`CorsLayer`]),
/// per spec.md §4.4.
#[must_use]
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/collections", get(list_collections).post(create_collection))
        .route("/collections/{name}", get(collection_stats).delete(delete_collection))
        .route("/stats/{name}", get(collection_stats))
        .route("/index/{name}", get(collection_stats))
        .route("/count/{name}", get(collection_count))
        .route("/save", post(save))
        .route("/save_all", post(save_all))
        .route("/insert", post(insert))
        .route("/batch_insert", post(batch_insert))
        .route("/search", post(search))
        .route("/batch_search", post(batch_search))
        .route("/search_with_filter", post(search_with_filter))
        .route("/vectors/{collection}/{id}", get(get_vector).put(update_vector).delete(delete_vector))
        .route("/tenants/{tenant}/namespaces", get(list_namespaces).post(create_namespace))
        .route("/tenants/{tenant}/search", post(search_tenant))
        .route("/tenants/{tenant}/stats", get(tenant_stats))
        .route("/tenants/{tenant}/{ns}/faq", post(create_faq))
        .route("/tenants/{tenant}/{ns}/faq/bulk", post(create_faq_bulk))
        .route(
            "/tenants/{tenant}/{ns}/faq/{id}",
            get(get_faq).put(update_faq).delete(delete_faq),
        )
        .route("/tenants/{tenant}/{ns}/search", post(search_namespace))
        .route("/tenants/{tenant}/{ns}/stats", get(namespace_stats))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;
    use velesdb_core::CollectionManager;

    async fn test_app() -> (tempfile::TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        let manager = CollectionManager::open(dir.path()).unwrap();
        let state = Arc::new(AppState { manager });
        (dir, build_router(state))
    }

    #[tokio::test]
    async fn health_check_returns_healthy_true() {
        let (_dir, app) = test_app().await;
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["healthy"], true);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let (_dir, app) = test_app().await;
        let response = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
