//! Request/response DTOs for the JSON API (spec.md §6).
//!
//! Grounded on the teacher's `types.rs` (flat `#[derive(Deserialize)]`
//! request structs, one response struct per endpoint shape, `#[serde(default
//! = "...")]` for optional fields with a fixed fallback) narrowed to the
//! fields spec.md's wire contract actually names.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn default_top_k() -> usize {
    10
}

// ---------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------

/// `GET /health` response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: &'static str,
}

// ---------------------------------------------------------------------
// Collection admin
// ---------------------------------------------------------------------

/// One entry of `GET /collections`.
#[derive(Debug, Serialize)]
pub struct CollectionSummary {
    pub name: String,
    pub dimension: usize,
    pub count: usize,
    pub metric: String,
}

/// `GET /collections` response.
#[derive(Debug, Serialize)]
pub struct ListCollectionsResponse {
    pub collections: Vec<CollectionSummary>,
}

/// `POST /collections` body.
#[derive(Debug, Deserialize)]
pub struct CreateCollectionRequest {
    pub name: String,
    pub dimension: usize,
    #[serde(default = "default_metric")]
    pub metric: String,
    pub m: Option<usize>,
    pub ef_construction: Option<usize>,
    pub ef_search: Option<usize>,
}

fn default_metric() -> String {
    "cosine".to_string()
}

/// Generic `{success, message}` response shape used by several admin endpoints.
#[derive(Debug, Serialize)]
pub struct SuccessMessageResponse {
    pub success: bool,
    pub message: String,
}

/// `{success}` response shape used by delete-style endpoints.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// `GET /count/{name}` response.
#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub collection: String,
    pub count: usize,
}

/// `POST /save` body; an absent or empty `collection` saves every collection.
#[derive(Debug, Deserialize, Default)]
pub struct SaveRequest {
    #[serde(default)]
    pub collection: Option<String>,
}

/// `POST /save` / `POST /save_all` response.
#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub success: bool,
    pub saved: usize,
}

// ---------------------------------------------------------------------
// Vector operations
// ---------------------------------------------------------------------

/// A vector as supplied by the caller in an insert request.
#[derive(Debug, Deserialize)]
pub struct VectorInput {
    #[serde(default)]
    pub id: Option<String>,
    pub values: Vec<f32>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

/// `POST /insert` body.
#[derive(Debug, Deserialize)]
pub struct InsertRequest {
    pub collection: String,
    pub vector: VectorInput,
}

/// `POST /insert` response.
#[derive(Debug, Serialize)]
pub struct InsertResponse {
    pub success: bool,
    pub id: String,
}

/// `POST /batch_insert` body.
#[derive(Debug, Deserialize)]
pub struct BatchInsertRequest {
    pub collection: String,
    pub vectors: Vec<VectorInput>,
}

/// `POST /batch_insert` response.
#[derive(Debug, Serialize)]
pub struct BatchInsertResponse {
    pub success: bool,
    pub inserted_count: usize,
    pub total_received: usize,
}

/// One entry of a search result list.
#[derive(Debug, Serialize, Clone)]
pub struct SearchResultItem {
    pub id: String,
    pub score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
}

/// `POST /search` body.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub collection: String,
    pub query: Vec<f32>,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub ef: usize,
}

/// `POST /search` / `POST /search_with_filter` response.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResultItem>,
    pub search_time_ms: f64,
}

/// `POST /search_with_filter` body: `SearchRequest` plus an exact-equality filter.
#[derive(Debug, Deserialize)]
pub struct SearchWithFilterRequest {
    pub collection: String,
    pub query: Vec<f32>,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub ef: usize,
    #[serde(default)]
    pub filter: HashMap<String, String>,
}

/// One query inside a `POST /batch_search` body.
#[derive(Debug, Deserialize)]
pub struct BatchQueryInput {
    pub values: Vec<f32>,
}

/// `POST /batch_search` body.
#[derive(Debug, Deserialize)]
pub struct BatchSearchRequest {
    pub collection: String,
    pub queries: Vec<BatchQueryInput>,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub ef: usize,
}

/// One query's worth of results inside a `POST /batch_search` response.
#[derive(Debug, Serialize)]
pub struct BatchSearchResultList {
    pub results: Vec<SearchResultItem>,
}

/// `POST /batch_search` response.
#[derive(Debug, Serialize)]
pub struct BatchSearchResponse {
    pub results: Vec<BatchSearchResultList>,
    pub total_queries: usize,
    pub total_time_ms: f64,
    pub avg_time_per_query_ms: f64,
}

/// `GET /vectors/{collection}/{id}` response.
#[derive(Debug, Serialize)]
pub struct VectorResponse {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: HashMap<String, String>,
}

/// `PUT /vectors/{collection}/{id}` body.
#[derive(Debug, Deserialize)]
pub struct UpdateVectorRequest {
    pub values: Vec<f32>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

// ---------------------------------------------------------------------
// Tenant routing
// ---------------------------------------------------------------------

/// One entry of `GET /tenants/{tenant}/namespaces`.
#[derive(Debug, Serialize)]
pub struct NamespaceSummary {
    pub namespace: String,
    pub dimension: usize,
    pub count: usize,
    pub metric: String,
}

/// `GET /tenants/{tenant}/namespaces` response.
#[derive(Debug, Serialize)]
pub struct ListNamespacesResponse {
    pub namespaces: Vec<NamespaceSummary>,
}

/// `POST /tenants/{tenant}/namespaces` body.
#[derive(Debug, Deserialize)]
pub struct CreateNamespaceRequest {
    pub namespace: String,
    pub dimension: Option<usize>,
    pub metric: Option<String>,
}

/// `POST /tenants/{tenant}/{ns}/faq` body.
#[derive(Debug, Deserialize)]
pub struct FaqInsertRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub category: Option<String>,
    pub vector: Vec<f32>,
}

/// `POST /tenants/{tenant}/{ns}/faq/bulk` body.
#[derive(Debug, Deserialize)]
pub struct FaqBulkRequest {
    pub items: Vec<FaqInsertRequest>,
}

/// `POST /tenants/{tenant}/{ns}/faq/bulk` response.
#[derive(Debug, Serialize)]
pub struct FaqBulkResponse {
    pub success: bool,
    pub inserted_count: usize,
    pub total_received: usize,
}

/// A FAQ entry shaped the way every FAQ-flavored read endpoint returns it.
#[derive(Debug, Serialize, Clone)]
pub struct FaqResponse {
    pub id: String,
    pub question: String,
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

/// `POST /tenants/{tenant}/{ns}/faq/{id}` (`PUT`) body.
#[derive(Debug, Deserialize)]
pub struct FaqUpdateRequest {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub category: Option<String>,
    pub vector: Vec<f32>,
}

/// `POST /tenants/{tenant}/{ns}/search` body.
#[derive(Debug, Deserialize)]
pub struct NamespaceSearchRequest {
    pub query: Vec<f32>,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub category: Option<String>,
}

/// Shared response shape for namespace and cross-tenant FAQ search.
#[derive(Debug, Serialize)]
pub struct FaqSearchResponse {
    pub results: Vec<FaqResponse>,
}

/// `POST /tenants/{tenant}/search` body: namespace search, fanned out across
/// every namespace belonging to the tenant unless `namespaces` narrows it.
#[derive(Debug, Deserialize)]
pub struct CrossTenantSearchRequest {
    pub query: Vec<f32>,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub namespaces: Option<Vec<String>>,
}

/// `GET /tenants/{tenant}/{ns}/stats` response.
#[derive(Debug, Serialize)]
pub struct NamespaceStatsResponse {
    pub namespace: String,
    pub count: usize,
    pub dimension: usize,
    pub metric: String,
}

/// `GET /tenants/{tenant}/stats` response: one entry per namespace plus the total.
#[derive(Debug, Serialize)]
pub struct TenantStatsResponse {
    pub tenant: String,
    pub namespaces: Vec<NamespaceStatsResponse>,
    pub total_count: usize,
}
