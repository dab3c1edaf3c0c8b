//! Collection admin handlers: list/create/delete/stats/save.
//!
//! Grounded on the teacher's `handlers/collections.rs` shape (`State<Arc<
//! AppState>>` + `Path` extractors, one handler per verb), adapted to
//! spec.md §6's endpoint set and wire shapes instead of the teacher's own.

use crate::error::ApiError;
use crate::metric::{metric_name, parse_metric};
use crate::state::{run_blocking, AppState};
use crate::types::{
    CollectionSummary, CountResponse, CreateCollectionRequest, ListCollectionsResponse,
    SaveRequest, SaveResponse, SuccessMessageResponse, SuccessResponse,
};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;
use velesdb_core::CollectionConfig;

/// `GET /collections`.
pub async fn list_collections(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let names = state.manager.list();
    let mut collections = Vec::with_capacity(names.len());
    for name in names {
        if let Ok(stats) = state.manager.stats(&name) {
            collections.push(CollectionSummary {
                name: stats.name,
                dimension: stats.dimension,
                count: stats.count,
                metric: metric_name(stats.metric).to_string(),
            });
        }
    }
    Ok(Json(ListCollectionsResponse { collections }))
}

/// `POST /collections`.
pub async fn create_collection(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateCollectionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let metric = parse_metric(&req.metric)?;
    let config = CollectionConfig::new(
        req.name.clone(),
        req.dimension,
        metric,
        req.m,
        req.ef_construction,
        req.ef_search,
    );

    let created = run_blocking(state, move |manager| manager.create(config)).await?;
    if created {
        Ok(Json(SuccessMessageResponse {
            success: true,
            message: format!("collection '{}' created", req.name),
        }))
    } else {
        Ok(Json(SuccessMessageResponse {
            success: false,
            message: format!("collection '{}' already exists", req.name),
        }))
    }
}

/// `DELETE /collections/{name}`.
pub async fn delete_collection(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let success = run_blocking(state, move |manager| manager.drop_collection(&name)).await?;
    Ok(Json(SuccessResponse { success }))
}

/// `GET /collections/{name}`, `GET /stats/{name}`, `GET /index/{name}`:
/// three aliases for the same stats object.
pub async fn collection_stats(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let stats = run_blocking(state, move |manager| manager.stats(&name)).await?;
    Ok(Json(stats))
}

/// `GET /count/{name}`.
pub async fn collection_count(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let stats = run_blocking(state, {
        let name = name.clone();
        move |manager| manager.stats(&name)
    })
    .await?;
    Ok(Json(CountResponse {
        collection: name,
        count: stats.count,
    }))
}

/// `POST /save`. Per spec.md §9's resolved ambiguity, a named collection
/// restricts the save to that one collection; an absent/empty name saves
/// every collection, same as `/save_all`.
pub async fn save(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SaveRequest>,
) -> Result<impl IntoResponse, ApiError> {
    match req.collection {
        Some(name) if !name.is_empty() => {
            run_blocking(state, move |manager| manager.save_one(&name)).await?;
            Ok(Json(SaveResponse {
                success: true,
                saved: 1,
            }))
        }
        _ => {
            let saved = run_blocking(state, |manager| Ok(manager.save_all())).await?;
            Ok(Json(SaveResponse {
                success: true,
                saved,
            }))
        }
    }
}

/// `POST /save_all`.
pub async fn save_all(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let saved = run_blocking(state, |manager| Ok(manager.save_all())).await?;
    Ok(Json(SaveResponse {
        success: true,
        saved,
    }))
}
