//! Shared application state and the blocking-call bridge every handler uses
//! to reach into [`CollectionManager`] without stalling the tokio runtime.
//!
//! Grounded on the teacher's own note in `handlers/points.rs::upsert_points`:
//! *"CRITICAL: upsert_bulk is blocking (HNSW insertion + I/O). Must use
//! spawn_blocking to avoid blocking the async runtime."* SPEC_FULL.md §5
//! applies that pattern to every handler that touches an index, not just
//! upsert.

use crate::error::ApiError;
use std::sync::Arc;
use velesdb_core::{CollectionManager, Error};

/// State shared across every axum handler: just the collection registry.
///
/// Modeled as a single owned object passed in by `Arc`, per spec.md §9 --
/// "do not make it a module-level singleton".
pub struct AppState {
    /// The collection registry. Owns its own locking; never wrapped in an
    /// additional outer lock here.
    pub manager: CollectionManager,
}

/// Runs a synchronous closure over the manager on a blocking thread pool
/// thread, surfacing its `velesdb_core::Error` as the wire-level [`ApiError`].
///
/// Every handler that calls into `CollectionManager` goes through this
/// instead of calling it inline on the async task, so a slow insert or
/// search never stalls other in-flight requests sharing the runtime.
pub async fn run_blocking<F, T>(state: Arc<AppState>, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&CollectionManager) -> Result<T, Error> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(move || f(&state.manager)).await {
        Ok(result) => result.map_err(ApiError::from),
        Err(join_err) => Err(ApiError(Error::Internal(format!(
            "worker thread panicked: {join_err}"
        )))),
    }
}
