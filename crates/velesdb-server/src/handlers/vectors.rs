//! Vector operation handlers: insert, batch insert, search (plain, filtered,
//! batched), point lookup/update/delete.
//!
//! Grounded on the teacher's `handlers/points.rs` / `handlers/search.rs`
//! shape (collection looked up first, blocking index op via
//! `spawn_blocking`, then a typed JSON response), adapted to spec.md §6's
//! single-collection-per-request wire shape.

use crate::error::ApiError;
use crate::state::{run_blocking, AppState};
use crate::types::{
    BatchInsertRequest, BatchInsertResponse, BatchSearchRequest, BatchSearchResponse,
    BatchSearchResultList, InsertRequest, InsertResponse, SearchRequest, SearchResponse,
    SearchResultItem, SearchWithFilterRequest, UpdateVectorRequest, VectorResponse,
};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use velesdb_core::{ScoredRecord, VectorRecord};

fn to_record(id: Option<String>, values: Vec<f32>, metadata: Option<HashMap<String, String>>) -> VectorRecord {
    VectorRecord {
        id: id.unwrap_or_default(),
        values,
        metadata: metadata.unwrap_or_default(),
    }
}

fn to_result_item(hit: ScoredRecord) -> SearchResultItem {
    SearchResultItem {
        id: hit.id,
        score: hit.score,
        metadata: if hit.metadata.is_empty() {
            None
        } else {
            Some(hit.metadata)
        },
    }
}

/// `POST /insert`.
pub async fn insert(
    State(state): State<Arc<AppState>>,
    Json(req): Json<InsertRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let record = to_record(req.vector.id, req.vector.values, req.vector.metadata);
    let id = run_blocking(state, move |manager| {
        manager.insert(&req.collection, record)
    })
    .await?;
    Ok(Json(InsertResponse { success: true, id }))
}

/// `POST /batch_insert`.
pub async fn batch_insert(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchInsertRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let total_received = req.vectors.len();
    let records: Vec<VectorRecord> = req
        .vectors
        .into_iter()
        .map(|v| to_record(v.id, v.values, v.metadata))
        .collect();

    let inserted_count = run_blocking(state, move |manager| {
        manager.batch_insert(&req.collection, records)
    })
    .await?;

    Ok(Json(BatchInsertResponse {
        success: true,
        inserted_count,
        total_received,
    }))
}

/// `POST /search`.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let started = Instant::now();
    let hits = run_blocking(state, move |manager| {
        manager.search(&req.collection, &req.query, req.top_k, req.ef)
    })
    .await?;

    Ok(Json(SearchResponse {
        results: hits.into_iter().map(to_result_item).collect(),
        search_time_ms: started.elapsed().as_secs_f64() * 1000.0,
    }))
}

/// `POST /search_with_filter`.
///
/// Over-fetches `top_k * 3` candidates and filters post-hoc inside
/// `HnswIndex::search_with_filter` -- a best-effort contract (spec.md §9)
/// that does not guarantee the final top-k is globally optimal once the
/// filter is applied.
pub async fn search_with_filter(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchWithFilterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let started = Instant::now();
    let hits = run_blocking(state, move |manager| {
        manager.search_with_filter(&req.collection, &req.query, req.top_k, req.ef, &req.filter)
    })
    .await?;

    Ok(Json(SearchResponse {
        results: hits.into_iter().map(to_result_item).collect(),
        search_time_ms: started.elapsed().as_secs_f64() * 1000.0,
    }))
}

/// `POST /batch_search`.
pub async fn batch_search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchSearchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let total_queries = req.queries.len();
    let queries: Vec<Vec<f32>> = req.queries.into_iter().map(|q| q.values).collect();

    let started = Instant::now();
    let results = run_blocking(state, move |manager| {
        manager.batch_search(&req.collection, &queries, req.top_k, req.ef)
    })
    .await?;
    let total_time_ms = started.elapsed().as_secs_f64() * 1000.0;

    let avg_time_per_query_ms = if total_queries == 0 {
        0.0
    } else {
        total_time_ms / total_queries as f64
    };

    Ok(Json(BatchSearchResponse {
        results: results
            .into_iter()
            .map(|hits| BatchSearchResultList {
                results: hits.into_iter().map(to_result_item).collect(),
            })
            .collect(),
        total_queries,
        total_time_ms,
        avg_time_per_query_ms,
    }))
}

/// `GET /vectors/{collection}/{id}`.
pub async fn get_vector(
    State(state): State<Arc<AppState>>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let not_found_id = id.clone();
    let record = run_blocking(state, move |manager| manager.get_vector(&collection, &id)).await?;
    match record {
        Some(record) => Ok(Json(VectorResponse {
            id: record.id,
            values: record.values,
            metadata: record.metadata,
        })),
        None => Err(velesdb_core::Error::VectorNotFound(not_found_id).into()),
    }
}

/// `PUT /vectors/{collection}/{id}`: remove-then-insert under the same id.
pub async fn update_vector(
    State(state): State<Arc<AppState>>,
    Path((collection, id)): Path<(String, String)>,
    Json(req): Json<UpdateVectorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let new_id = run_blocking(state, move |manager| {
        manager.remove(&collection, &id)?;
        let record = to_record(Some(id), req.values, req.metadata);
        manager.insert(&collection, record)
    })
    .await?;
    Ok(Json(InsertResponse {
        success: true,
        id: new_id,
    }))
}

/// `DELETE /vectors/{collection}/{id}`.
pub async fn delete_vector(
    State(state): State<Arc<AppState>>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let success = run_blocking(state, move |manager| manager.remove(&collection, &id)).await?;
    Ok(Json(crate::types::SuccessResponse { success }))
}
