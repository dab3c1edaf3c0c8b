//! HNSW index construction/search parameters.

use serde::{Deserialize, Serialize};

/// Tuning parameters for a single HNSW graph.
///
/// Fixed at the defaults below rather than scaled by dimension or expected
/// dataset size; a collection that needs different recall/latency tradeoffs
/// sets these explicitly at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HnswParams {
    /// Number of bi-directional links per node above layer 0 (the `M` parameter).
    pub max_connections: usize,
    /// Size of the dynamic candidate list used while building the graph.
    pub ef_construction: usize,
    /// Size of the dynamic candidate list used while searching, when the
    /// caller does not override it per-query.
    pub ef_search: usize,
    /// Initial capacity; the graph grows past this automatically.
    pub max_elements: usize,
}

impl Default for HnswParams {
    fn default() -> Self {
        Self {
            max_connections: 16,
            ef_construction: 200,
            ef_search: 50,
            max_elements: 1_000_000,
        }
    }
}

impl HnswParams {
    /// Returns the effective `ef` to use for a search: `ef_search` when the
    /// caller passes `0`, otherwise the caller's value clamped to at least `k`.
    #[must_use]
    pub fn resolve_ef(&self, requested: usize, k: usize) -> usize {
        if requested == 0 {
            self.ef_search.max(k)
        } else {
            requested.max(k)
        }
    }
}
