//! End-to-end tests against the full JSON API, exercised in-process via
//! `tower::ServiceExt::oneshot` (no sockets).
//!
//! Grounded on the teacher's own `tests/api_integration.rs` harness shape
//! (one `Router` built over a tempdir-backed state, requests sent via
//! `oneshot`), rebuilt against `velesdb_server::build_router` and spec.md
//! §6's actual endpoint set instead of the teacher's graph/VelesQL routes.

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;
use velesdb_core::CollectionManager;
use velesdb_server::{build_router, AppState};

fn app() -> (TempDir, Router) {
    let dir = tempfile::tempdir().expect("tempdir");
    let manager = CollectionManager::open(dir.path()).expect("open manager");
    let state = Arc::new(AppState { manager });
    (dir, build_router(state))
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let body = match body {
        Some(v) => Body::from(serde_json::to_vec(&v).unwrap()),
        None => Body::empty(),
    };
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn health_check_reports_healthy() {
    let (_dir, app) = app();
    let (status, body) = call(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["healthy"], true);
}

#[tokio::test]
async fn collection_lifecycle_create_list_stats_delete() {
    let (_dir, app) = app();

    let (status, body) = call(
        &app,
        Method::POST,
        "/collections",
        Some(json!({"name": "docs", "dimension": 4, "metric": "cosine"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = call(
        &app,
        Method::POST,
        "/collections",
        Some(json!({"name": "docs", "dimension": 4, "metric": "cosine"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "creating twice should not error");

    let (status, body) = call(&app, Method::GET, "/collections", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["collections"].as_array().unwrap().len(), 1);
    assert_eq!(body["collections"][0]["name"], "docs");

    let (status, body) = call(&app, Method::GET, "/stats/docs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dimension"], 4);
    assert_eq!(body["count"], 0);

    let (status, body) = call(&app, Method::DELETE, "/collections/docs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = call(&app, Method::GET, "/stats/docs", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn insert_then_search_returns_nearest_neighbor_first() {
    let (_dir, app) = app();
    call(
        &app,
        Method::POST,
        "/collections",
        Some(json!({"name": "docs", "dimension": 3, "metric": "euclidean"})),
    )
    .await;

    for (id, values) in [
        ("a", vec![1.0, 0.0, 0.0]),
        ("b", vec![0.0, 1.0, 0.0]),
        ("c", vec![0.0, 0.0, 1.0]),
    ] {
        let (status, body) = call(
            &app,
            Method::POST,
            "/insert",
            Some(json!({"collection": "docs", "vector": {"id": id, "values": values}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], id);
    }

    // b and c are equidistant from the query; ties break by insertion order,
    // so b (inserted second) must win over c (inserted third).
    let (status, body) = call(
        &app,
        Method::POST,
        "/search",
        Some(json!({"collection": "docs", "query": [1.0, 0.0, 0.0], "top_k": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["id"], "a");
    assert_eq!(results[1]["id"], "b");
}

#[tokio::test]
async fn search_with_filter_honors_metadata_equality() {
    let (_dir, app) = app();
    call(
        &app,
        Method::POST,
        "/collections",
        Some(json!({"name": "docs", "dimension": 2, "metric": "euclidean"})),
    )
    .await;

    call(
        &app,
        Method::POST,
        "/batch_insert",
        Some(json!({"collection": "docs", "vectors": [
            {"id": "kept", "values": [1.0, 0.0], "metadata": {"lang": "en"}},
            {"id": "dropped", "values": [1.0, 0.0], "metadata": {"lang": "fr"}},
        ]})),
    )
    .await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/search_with_filter",
        Some(json!({
            "collection": "docs",
            "query": [1.0, 0.0],
            "top_k": 5,
            "filter": {"lang": "en"},
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["id"], "kept");
}

#[tokio::test]
async fn vector_get_update_delete_round_trip() {
    let (_dir, app) = app();
    call(
        &app,
        Method::POST,
        "/collections",
        Some(json!({"name": "docs", "dimension": 2, "metric": "euclidean"})),
    )
    .await;
    call(
        &app,
        Method::POST,
        "/insert",
        Some(json!({"collection": "docs", "vector": {"id": "v1", "values": [1.0, 2.0]}})),
    )
    .await;

    let (status, body) = call(&app, Method::GET, "/vectors/docs/v1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["values"], json!([1.0, 2.0]));

    let (status, _) = call(
        &app,
        Method::PUT,
        "/vectors/docs/v1",
        Some(json!({"values": [3.0, 4.0]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = call(&app, Method::GET, "/vectors/docs/v1", None).await;
    assert_eq!(body["values"], json!([3.0, 4.0]));

    let (status, body) = call(&app, Method::DELETE, "/vectors/docs/v1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = call(&app, Method::GET, "/vectors/docs/v1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn batch_search_reports_per_query_results_and_timing() {
    let (_dir, app) = app();
    call(
        &app,
        Method::POST,
        "/collections",
        Some(json!({"name": "docs", "dimension": 2, "metric": "euclidean"})),
    )
    .await;
    call(
        &app,
        Method::POST,
        "/batch_insert",
        Some(json!({"collection": "docs", "vectors": [
            {"id": "a", "values": [1.0, 0.0]},
            {"id": "b", "values": [0.0, 1.0]},
        ]})),
    )
    .await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/batch_search",
        Some(json!({
            "collection": "docs",
            "queries": [{"values": [1.0, 0.0]}, {"values": [0.0, 1.0]}],
            "top_k": 1,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_queries"], 2);
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
    assert_eq!(body["results"][0]["results"][0]["id"], "a");
    assert_eq!(body["results"][1]["results"][0]["id"], "b");
    assert!(body["total_time_ms"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn insert_on_unknown_collection_is_404() {
    let (_dir, app) = app();
    let (status, body) = call(
        &app,
        Method::POST,
        "/insert",
        Some(json!({"collection": "ghost", "vector": {"values": [1.0]}})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("ghost"));
}

#[tokio::test]
async fn dimension_mismatch_is_400() {
    let (_dir, app) = app();
    call(
        &app,
        Method::POST,
        "/collections",
        Some(json!({"name": "docs", "dimension": 3, "metric": "cosine"})),
    )
    .await;
    let (status, _) = call(
        &app,
        Method::POST,
        "/insert",
        Some(json!({"collection": "docs", "vector": {"values": [1.0, 2.0]}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn save_then_reopen_persists_vectors() {
    let dir = tempfile::tempdir().unwrap();
    {
        let manager = CollectionManager::open(dir.path()).unwrap();
        let state = Arc::new(AppState { manager });
        let app = build_router(state);

        call(
            &app,
            Method::POST,
            "/collections",
            Some(json!({"name": "docs", "dimension": 2, "metric": "cosine"})),
        )
        .await;
        call(
            &app,
            Method::POST,
            "/insert",
            Some(json!({"collection": "docs", "vector": {"id": "v1", "values": [1.0, 0.0]}})),
        )
        .await;
        let (status, body) = call(&app, Method::POST, "/save", Some(json!({"collection": "docs"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["saved"], 1);
    }

    let manager = CollectionManager::open(dir.path()).unwrap();
    let state = Arc::new(AppState { manager });
    let app = build_router(state);
    let (status, body) = call(&app, Method::GET, "/vectors/docs/v1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["values"], json!([1.0, 0.0]));
}

// ---------------------------------------------------------------------
// Tenant routing
// ---------------------------------------------------------------------

#[tokio::test]
async fn tenant_faq_create_search_and_stats() {
    let (_dir, app) = app();

    let (status, _) = call(
        &app,
        Method::POST,
        "/tenants/acme/namespaces",
        Some(json!({"namespace": "support", "dimension": 3, "metric": "cosine"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(
        &app,
        Method::POST,
        "/tenants/acme/support/faq",
        Some(json!({
            "question": "How do I reset my password?",
            "answer": "Use the forgot-password link.",
            "category": "account",
            "vector": [1.0, 0.0, 0.0],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let faq_id = body["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        &app,
        Method::POST,
        "/tenants/acme/support/search",
        Some(json!({"query": [0.9, 0.1, 0.0], "top_k": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["id"], faq_id);
    assert_eq!(results[0]["category"], "account");

    let (status, body) = call(&app, Method::GET, "/tenants/acme/support/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    let (status, body) = call(&app, Method::GET, "/tenants/acme/namespaces", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["namespaces"].as_array().unwrap().len(), 1);
    assert_eq!(body["namespaces"][0]["namespace"], "support");
}

#[tokio::test]
async fn tenant_search_fans_out_across_namespaces_and_respects_category() {
    let (_dir, app) = app();

    for ns in ["billing", "support"] {
        call(
            &app,
            Method::POST,
            "/tenants/acme/namespaces",
            Some(json!({"namespace": ns, "dimension": 2, "metric": "cosine"})),
        )
        .await;
    }

    call(
        &app,
        Method::POST,
        "/tenants/acme/billing/faq",
        Some(json!({"question": "billing q", "answer": "billing a", "category": "billing", "vector": [1.0, 0.0]})),
    )
    .await;
    call(
        &app,
        Method::POST,
        "/tenants/acme/support/faq",
        Some(json!({"question": "support q", "answer": "support a", "category": "support", "vector": [0.0, 1.0]})),
    )
    .await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/tenants/acme/search",
        Some(json!({"query": [1.0, 0.0], "top_k": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"].as_array().unwrap().len(), 2);

    let (status, body) = call(
        &app,
        Method::POST,
        "/tenants/acme/search",
        Some(json!({"query": [1.0, 0.0], "top_k": 5, "category": "billing"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["category"], "billing");

    let (status, body) = call(&app, Method::GET, "/tenants/acme/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_count"], 2);
    assert_eq!(body["namespaces"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn faq_update_and_delete() {
    let (_dir, app) = app();
    call(
        &app,
        Method::POST,
        "/tenants/acme/namespaces",
        Some(json!({"namespace": "kb", "dimension": 2, "metric": "cosine"})),
    )
    .await;
    let (_, body) = call(
        &app,
        Method::POST,
        "/tenants/acme/kb/faq",
        Some(json!({"question": "q1", "answer": "a1", "vector": [1.0, 0.0]})),
    )
    .await;
    let id = body["id"].as_str().unwrap().to_string();

    let (status, _) = call(
        &app,
        Method::PUT,
        &format!("/tenants/acme/kb/faq/{id}"),
        Some(json!({"question": "q1 updated", "answer": "a1 updated", "vector": [1.0, 0.0]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, Method::GET, &format!("/tenants/acme/kb/faq/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["question"], "q1 updated");

    let (status, body) = call(&app, Method::DELETE, &format!("/tenants/acme/kb/faq/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = call(&app, Method::GET, &format!("/tenants/acme/kb/faq/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_route_is_404() {
    let (_dir, app) = app();
    let (status, _) = call(&app, Method::GET, "/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
