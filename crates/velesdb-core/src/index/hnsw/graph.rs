//! The HNSW graph itself: layered adjacency lists over raw node ids, built
//! and searched per Malkov & Yashunin. Grounded on `native/graph.rs`'s
//! `NativeHnsw`, trimmed of VAMANA diversification and multi-entry search
//! (not part of this service's contract) and extended with tombstone-aware
//! search so lazily deleted nodes stop surfacing in results without a full
//! graph rebuild.

use super::layer::{Layer, NodeId};
use super::ordered_float::OrderedFloat;
use crate::distance::DistanceMetric;
use parking_lot::RwLock;
use rustc_hash::FxHashSet;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// The bare graph: vectors, layered adjacency, and the entry point.
///
/// Owns no notion of string ids or metadata — that bookkeeping lives one
/// level up in [`super::index::HnswIndex`]. `NodeId` here is simply a dense
/// index into `vectors`.
pub(crate) struct HnswGraph {
    metric: DistanceMetric,
    dim: usize,
    vectors: RwLock<Vec<Vec<f32>>>,
    layers: RwLock<Vec<Layer>>,
    entry_point: RwLock<Option<NodeId>>,
    max_layer: AtomicUsize,
    count: AtomicUsize,
    rng_state: AtomicU64,
    deleted: RwLock<FxHashSet<NodeId>>,
    max_connections: usize,
    max_connections_0: usize,
    ef_construction: usize,
    level_mult: f64,
}

impl HnswGraph {
    pub(crate) fn new(
        metric: DistanceMetric,
        dim: usize,
        max_connections: usize,
        ef_construction: usize,
        max_elements: usize,
    ) -> Self {
        let max_connections_0 = max_connections * 2;
        let level_mult = 1.0 / (max_connections.max(2) as f64).ln();

        Self {
            metric,
            dim,
            vectors: RwLock::new(Vec::with_capacity(max_elements)),
            layers: RwLock::new(vec![Layer::new(max_elements)]),
            entry_point: RwLock::new(None),
            max_layer: AtomicUsize::new(0),
            count: AtomicUsize::new(0),
            rng_state: AtomicU64::new(0x5DEE_CE66_D1A4_B5B5),
            deleted: RwLock::new(FxHashSet::default()),
            max_connections,
            max_connections_0,
            ef_construction,
            level_mult,
        }
    }

    /// Number of live (non-tombstoned) nodes.
    pub(crate) fn len(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        self.metric.distance(a, b, self.dim)
    }

    /// Inserts a vector, returning the node id assigned to it.
    pub(crate) fn insert(&self, vector: Vec<f32>) -> NodeId {
        let node_id = {
            let mut vectors = self.vectors.write();
            let id = vectors.len();
            vectors.push(vector);
            id
        };

        let node_layer = self.random_layer();

        {
            let mut layers = self.layers.write();
            while layers.len() <= node_layer {
                layers.push(Layer::new(node_id + 1));
            }
            for layer in layers.iter_mut() {
                layer.ensure_capacity(node_id);
            }
        }

        let entry_point = *self.entry_point.read();

        if let Some(ep) = entry_point {
            let mut current_ep = ep;
            let max_layer = self.max_layer.load(Ordering::Relaxed);
            let query = self.get_vector(node_id);

            for layer_idx in (node_layer + 1..=max_layer).rev() {
                current_ep = self.search_layer_single(&query, current_ep, layer_idx);
            }

            for layer_idx in (0..=node_layer.min(max_layer)).rev() {
                let neighbors =
                    self.search_layer(&query, vec![current_ep], self.ef_construction, layer_idx);

                let max_conn = if layer_idx == 0 {
                    self.max_connections_0
                } else {
                    self.max_connections
                };
                let selected = self.select_neighbors(&neighbors, max_conn);

                self.layers.read()[layer_idx].set_neighbors(node_id, selected.clone());

                for &neighbor in &selected {
                    self.add_bidirectional_connection(node_id, neighbor, layer_idx, max_conn);
                }

                if !neighbors.is_empty() {
                    current_ep = neighbors[0].0;
                }
            }
        } else {
            *self.entry_point.write() = Some(node_id);
        }

        if node_layer > self.max_layer.load(Ordering::Relaxed) || entry_point.is_none() {
            self.max_layer.store(node_layer, Ordering::Relaxed);
            *self.entry_point.write() = Some(node_id);
        }

        self.count.fetch_add(1, Ordering::Relaxed);
        node_id
    }

    /// Marks a node as deleted. Its edges stay in place so neighboring nodes
    /// remain reachable; `search` filters it out of results and out of the
    /// beam's accounting.
    pub(crate) fn mark_deleted(&self, node_id: NodeId) {
        if self.deleted.write().insert(node_id) {
            self.count.fetch_sub(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn is_deleted(&self, node_id: NodeId) -> bool {
        self.deleted.read().contains(&node_id)
    }

    /// Returns up to `k` nearest neighbors as `(node_id, distance)`, closest first.
    pub(crate) fn search(&self, query: &[f32], k: usize, ef_search: usize) -> Vec<(NodeId, f32)> {
        let Some(ep) = *self.entry_point.read() else {
            return Vec::new();
        };

        let max_layer = self.max_layer.load(Ordering::Relaxed);
        let mut current_ep = ep;
        for layer_idx in (1..=max_layer).rev() {
            current_ep = self.search_layer_single(query, current_ep, layer_idx);
        }

        let candidates = self.search_layer(query, vec![current_ep], ef_search.max(k), 0);
        candidates
            .into_iter()
            .filter(|(id, _)| !self.is_deleted(*id))
            .take(k)
            .collect()
    }

    pub(crate) fn get_vector(&self, node_id: NodeId) -> Vec<f32> {
        self.vectors.read()[node_id].clone()
    }

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn random_layer(&self) -> usize {
        let mut state = self.rng_state.load(Ordering::Relaxed);
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        self.rng_state.store(state, Ordering::Relaxed);

        let uniform = ((state >> 11) as f64 + 1.0) / ((1u64 << 53) as f64 + 1.0);
        let level = (-uniform.ln() * self.level_mult).floor() as usize;
        level.min(15)
    }

    fn search_layer_single(&self, query: &[f32], entry: NodeId, layer: usize) -> NodeId {
        let mut best = entry;
        let mut best_dist = self.distance(query, &self.get_vector(entry));

        loop {
            let neighbors = self.layers.read()[layer].get_neighbors(best);
            let mut improved = false;

            for neighbor in neighbors {
                let dist = self.distance(query, &self.get_vector(neighbor));
                if dist < best_dist {
                    best = neighbor;
                    best_dist = dist;
                    improved = true;
                }
            }

            if !improved {
                break;
            }
        }

        best
    }

    fn search_layer(
        &self,
        query: &[f32],
        entry_points: Vec<NodeId>,
        ef: usize,
        layer: usize,
    ) -> Vec<(NodeId, f32)> {
        let mut visited: FxHashSet<NodeId> = FxHashSet::default();
        let mut candidates: BinaryHeap<Reverse<(OrderedFloat, NodeId)>> = BinaryHeap::new();
        let mut results: BinaryHeap<(OrderedFloat, NodeId)> = BinaryHeap::new();

        let vectors = self.vectors.read();

        for ep in entry_points {
            let dist = self.distance(query, &vectors[ep]);
            candidates.push(Reverse((OrderedFloat(dist), ep)));
            results.push((OrderedFloat(dist), ep));
            visited.insert(ep);
        }

        while let Some(Reverse((OrderedFloat(c_dist), c_node))) = candidates.pop() {
            let furthest_dist = results.peek().map_or(f32::MAX, |r| r.0 .0);

            if c_dist > furthest_dist && results.len() >= ef {
                break;
            }

            let neighbors = self.layers.read()[layer].get_neighbors(c_node);

            for neighbor in neighbors {
                if visited.insert(neighbor) {
                    let dist = self.distance(query, &vectors[neighbor]);
                    let furthest = results.peek().map_or(f32::MAX, |r| r.0 .0);

                    if dist < furthest || results.len() < ef {
                        candidates.push(Reverse((OrderedFloat(dist), neighbor)));
                        results.push((OrderedFloat(dist), neighbor));

                        if results.len() > ef {
                            results.pop();
                        }
                    }
                }
            }
        }

        let mut result_vec: Vec<(NodeId, f32)> =
            results.into_iter().map(|(d, n)| (n, d.0)).collect();
        // Ties break by ascending node id, i.e. insertion order: a `BinaryHeap`
        // gives no guarantee about the relative order of equal-distance entries.
        result_vec.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        result_vec
    }

    fn select_neighbors(&self, candidates: &[(NodeId, f32)], max_neighbors: usize) -> Vec<NodeId> {
        candidates
            .iter()
            .take(max_neighbors)
            .map(|(id, _)| *id)
            .collect()
    }

    fn add_bidirectional_connection(
        &self,
        new_node: NodeId,
        neighbor: NodeId,
        layer: usize,
        max_conn: usize,
    ) {
        let neighbor_vec = self.get_vector(neighbor);
        let current_neighbors = self.layers.read()[layer].get_neighbors(neighbor);

        if current_neighbors.len() < max_conn {
            let layers = self.layers.read();
            let mut neighbors = layers[layer].get_neighbors(neighbor);
            neighbors.push(new_node);
            layers[layer].set_neighbors(neighbor, neighbors);
        } else {
            let mut all_neighbors = current_neighbors.clone();
            all_neighbors.push(new_node);

            let neighbor_vecs: Vec<(NodeId, Vec<f32>)> = all_neighbors
                .iter()
                .map(|&n| (n, self.get_vector(n)))
                .collect();

            let mut with_dist: Vec<(NodeId, f32)> = neighbor_vecs
                .iter()
                .map(|(n, n_vec)| (*n, self.distance(&neighbor_vec, n_vec)))
                .collect();

            with_dist.sort_by(|a, b| a.1.total_cmp(&b.1));
            let pruned: Vec<NodeId> = with_dist
                .into_iter()
                .take(max_conn)
                .map(|(n, _)| n)
                .collect();

            self.layers.read()[layer].set_neighbors(neighbor, pruned);
        }
    }
}
