//! Tenant routing layer (spec.md §4.5): maps `(tenant_id, namespace)` URLs
//! onto synthetic `"{tenant}__{namespace}"` collection names and stamps/
//! extracts the FAQ-flavored metadata keys the tenant endpoints trade in.
//!
//! New relative to the teacher (which has no multi-tenant concept), but
//! grounded on the file-per-concern handler layout and
//! `State<Arc<AppState>>` + `Path` extractor style of `handlers/
//! collections.rs` / `handlers/points.rs`.

use crate::error::{bad_request, ApiError};
use crate::metric::{metric_name, parse_metric};
use crate::state::{run_blocking, AppState};
use crate::types::{
    CreateNamespaceRequest, FaqBulkRequest, FaqBulkResponse, FaqInsertRequest, FaqResponse,
    FaqSearchResponse, FaqUpdateRequest, ListNamespacesResponse, NamespaceSearchRequest,
    NamespaceStatsResponse, NamespaceSummary, SuccessMessageResponse, SuccessResponse,
    TenantStatsResponse, CrossTenantSearchRequest,
};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use std::collections::HashMap;
use std::sync::Arc;
use velesdb_core::{CollectionConfig, DistanceMetric, ScoredRecord, VectorRecord};

/// A namespace with no explicit `dimension` at creation gets this width.
/// spec.md leaves the default unspecified (§6: `dimension?`); chosen to
/// match common sentence-embedding widths, recorded as an Open Question
/// resolution in DESIGN.md.
const DEFAULT_NAMESPACE_DIMENSION: usize = 768;

fn collection_name(tenant: &str, namespace: &str) -> String {
    format!("{tenant}__{namespace}")
}

fn namespace_prefix(tenant: &str) -> String {
    format!("{tenant}__")
}

fn faq_metadata(
    tenant: &str,
    namespace: &str,
    question: &str,
    answer: &str,
    category: Option<&str>,
) -> HashMap<String, String> {
    let mut metadata = HashMap::new();
    metadata.insert("type".to_string(), "faq".to_string());
    metadata.insert("tenant_id".to_string(), tenant.to_string());
    metadata.insert("namespace".to_string(), namespace.to_string());
    metadata.insert("question".to_string(), question.to_string());
    metadata.insert("answer".to_string(), answer.to_string());
    if let Some(category) = category {
        metadata.insert("category".to_string(), category.to_string());
    }
    metadata
}

fn to_faq_response(id: String, metadata: &HashMap<String, String>, score: Option<f32>) -> FaqResponse {
    FaqResponse {
        id,
        question: metadata.get("question").cloned().unwrap_or_default(),
        answer: metadata.get("answer").cloned().unwrap_or_default(),
        category: metadata.get("category").cloned(),
        score,
    }
}

fn from_hit(hit: ScoredRecord) -> FaqResponse {
    to_faq_response(hit.id, &hit.metadata, Some(hit.score))
}

/// `GET /tenants/{tenant}/namespaces`.
pub async fn list_namespaces(
    State(state): State<Arc<AppState>>,
    Path(tenant): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let prefix = namespace_prefix(&tenant);
    let names = state.manager.list();
    let mut namespaces = Vec::new();
    for name in names {
        let Some(ns) = name.strip_prefix(&prefix) else {
            continue;
        };
        if let Ok(stats) = state.manager.stats(&name) {
            namespaces.push(NamespaceSummary {
                namespace: ns.to_string(),
                dimension: stats.dimension,
                count: stats.count,
                metric: metric_name(stats.metric).to_string(),
            });
        }
    }
    Ok(Json(ListNamespacesResponse { namespaces }))
}

/// `POST /tenants/{tenant}/namespaces`.
pub async fn create_namespace(
    State(state): State<Arc<AppState>>,
    Path(tenant): Path<String>,
    Json(req): Json<CreateNamespaceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let metric = match req.metric {
        Some(raw) => parse_metric(&raw)?,
        None => DistanceMetric::Cosine,
    };
    let dimension = req.dimension.unwrap_or(DEFAULT_NAMESPACE_DIMENSION);
    let name = collection_name(&tenant, &req.namespace);
    let config = CollectionConfig::new(name.clone(), dimension, metric, None, None, None);

    let created = run_blocking(state, move |manager| manager.create(config)).await?;
    Ok(Json(SuccessMessageResponse {
        success: created,
        message: if created {
            format!("namespace '{}' created", req.namespace)
        } else {
            format!("namespace '{}' already exists", req.namespace)
        },
    }))
}

/// `POST /tenants/{tenant}/{ns}/faq`.
pub async fn create_faq(
    State(state): State<Arc<AppState>>,
    Path((tenant, ns)): Path<(String, String)>,
    Json(req): Json<FaqInsertRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = collection_name(&tenant, &ns);
    let metadata = faq_metadata(&tenant, &ns, &req.question, &req.answer, req.category.as_deref());
    let record = VectorRecord {
        id: req.id.unwrap_or_default(),
        values: req.vector,
        metadata,
    };
    let id = run_blocking(state, move |manager| manager.insert(&name, record)).await?;
    Ok(Json(crate::types::InsertResponse { success: true, id }))
}

/// `POST /tenants/{tenant}/{ns}/faq/bulk`.
pub async fn create_faq_bulk(
    State(state): State<Arc<AppState>>,
    Path((tenant, ns)): Path<(String, String)>,
    Json(req): Json<FaqBulkRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = collection_name(&tenant, &ns);
    let total_received = req.items.len();
    let records: Vec<VectorRecord> = req
        .items
        .into_iter()
        .map(|item| VectorRecord {
            id: item.id.unwrap_or_default(),
            values: item.vector,
            metadata: faq_metadata(&tenant, &ns, &item.question, &item.answer, item.category.as_deref()),
        })
        .collect();

    let inserted_count = run_blocking(state, move |manager| manager.batch_insert(&name, records)).await?;
    Ok(Json(FaqBulkResponse {
        success: true,
        inserted_count,
        total_received,
    }))
}

/// `GET /tenants/{tenant}/{ns}/faq/{id}`.
pub async fn get_faq(
    State(state): State<Arc<AppState>>,
    Path((tenant, ns, id)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let name = collection_name(&tenant, &ns);
    let not_found_id = id.clone();
    let record = run_blocking(state, move |manager| manager.get_vector(&name, &id)).await?;
    match record {
        Some(record) => Ok(Json(to_faq_response(record.id, &record.metadata, None))),
        None => Err(velesdb_core::Error::VectorNotFound(not_found_id).into()),
    }
}

/// `PUT /tenants/{tenant}/{ns}/faq/{id}`: remove-then-insert under the same id.
pub async fn update_faq(
    State(state): State<Arc<AppState>>,
    Path((tenant, ns, id)): Path<(String, String, String)>,
    Json(req): Json<FaqUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = collection_name(&tenant, &ns);
    let metadata = faq_metadata(&tenant, &ns, &req.question, &req.answer, req.category.as_deref());
    let new_id = run_blocking(state, move |manager| {
        manager.remove(&name, &id)?;
        manager.insert(
            &name,
            VectorRecord {
                id,
                values: req.vector,
                metadata,
            },
        )
    })
    .await?;
    Ok(Json(crate::types::InsertResponse {
        success: true,
        id: new_id,
    }))
}

/// `DELETE /tenants/{tenant}/{ns}/faq/{id}`.
pub async fn delete_faq(
    State(state): State<Arc<AppState>>,
    Path((tenant, ns, id)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let name = collection_name(&tenant, &ns);
    let success = run_blocking(state, move |manager| manager.remove(&name, &id)).await?;
    Ok(Json(SuccessResponse { success }))
}

/// `POST /tenants/{tenant}/{ns}/search`.
pub async fn search_namespace(
    State(state): State<Arc<AppState>>,
    Path((tenant, ns)): Path<(String, String)>,
    Json(req): Json<NamespaceSearchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = collection_name(&tenant, &ns);
    let category = req.category.clone();
    let hits = run_blocking(state, move |manager| {
        if let Some(category) = category {
            let mut filter = HashMap::new();
            filter.insert("category".to_string(), category);
            manager.search_with_filter(&name, &req.query, req.top_k, 0, &filter)
        } else {
            manager.search(&name, &req.query, req.top_k, 0)
        }
    })
    .await?;

    Ok(Json(FaqSearchResponse {
        results: hits.into_iter().map(from_hit).collect(),
    }))
}

/// `GET /tenants/{tenant}/{ns}/stats`.
pub async fn namespace_stats(
    State(state): State<Arc<AppState>>,
    Path((tenant, ns)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let name = collection_name(&tenant, &ns);
    let stats = run_blocking(state, move |manager| manager.stats(&name)).await?;
    Ok(Json(NamespaceStatsResponse {
        namespace: ns,
        count: stats.count,
        dimension: stats.dimension,
        metric: metric_name(stats.metric).to_string(),
    }))
}

/// `POST /tenants/{tenant}/search`: fans out across every namespace the
/// tenant owns (or the subset named in `namespaces`), merges by ascending
/// distance, and returns the overall top-k.
pub async fn search_tenant(
    State(state): State<Arc<AppState>>,
    Path(tenant): Path<String>,
    Json(req): Json<CrossTenantSearchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.query.is_empty() {
        return Err(bad_request("query vector must not be empty"));
    }
    let prefix = namespace_prefix(&tenant);
    let top_k = req.top_k;
    let category = req.category.clone();
    let requested_namespaces = req.namespaces.clone();

    let mut merged = run_blocking(state, move |manager| {
        let names: Vec<String> = manager
            .list()
            .into_iter()
            .filter(|name| {
                name.strip_prefix(&prefix).is_some_and(|ns| {
                    requested_namespaces
                        .as_ref()
                        .is_none_or(|wanted| wanted.iter().any(|w| w == ns))
                })
            })
            .collect();

        let mut all = Vec::new();
        for name in names {
            let hits = if let Some(category) = &category {
                let mut filter = HashMap::new();
                filter.insert("category".to_string(), category.clone());
                manager.search_with_filter(&name, &req.query, top_k, 0, &filter)
            } else {
                manager.search(&name, &req.query, top_k, 0)
            };
            if let Ok(hits) = hits {
                all.extend(hits);
            }
        }
        Ok(all)
    })
    .await?;

    merged.sort_by(|a, b| a.score.total_cmp(&b.score));
    merged.truncate(top_k);

    Ok(Json(FaqSearchResponse {
        results: merged.into_iter().map(from_hit).collect(),
    }))
}

/// `GET /tenants/{tenant}/stats`: aggregate stats across every namespace.
pub async fn tenant_stats(
    State(state): State<Arc<AppState>>,
    Path(tenant): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let prefix = namespace_prefix(&tenant);
    let names = state.manager.list();
    let mut namespaces = Vec::new();
    let mut total_count = 0usize;
    for name in names {
        let Some(ns) = name.strip_prefix(&prefix) else {
            continue;
        };
        if let Ok(stats) = state.manager.stats(&name) {
            total_count += stats.count;
            namespaces.push(NamespaceStatsResponse {
                namespace: ns.to_string(),
                count: stats.count,
                dimension: stats.dimension,
                metric: metric_name(stats.metric).to_string(),
            });
        }
    }
    Ok(Json(TenantStatsResponse {
        tenant,
        namespaces,
        total_count,
    }))
}
