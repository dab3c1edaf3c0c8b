//! A single layer of the HNSW hierarchy: a per-node adjacency list.

use parking_lot::RwLock;

/// Index into the graph's internal vector storage.
pub(crate) type NodeId = usize;

/// One level of the HNSW hierarchy.
///
/// Layer 0 holds every inserted node; higher layers hold an exponentially
/// thinning subset, giving the graph its logarithmic search depth.
#[derive(Debug)]
pub(crate) struct Layer {
    neighbors: Vec<RwLock<Vec<NodeId>>>,
}

impl Layer {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            neighbors: (0..capacity).map(|_| RwLock::new(Vec::new())).collect(),
        }
    }

    pub(crate) fn ensure_capacity(&mut self, node_id: NodeId) {
        while self.neighbors.len() <= node_id {
            self.neighbors.push(RwLock::new(Vec::new()));
        }
    }

    pub(crate) fn get_neighbors(&self, node_id: NodeId) -> Vec<NodeId> {
        if node_id < self.neighbors.len() {
            self.neighbors[node_id].read().clone()
        } else {
            Vec::new()
        }
    }

    pub(crate) fn set_neighbors(&self, node_id: NodeId, neighbors: Vec<NodeId>) {
        if node_id < self.neighbors.len() {
            *self.neighbors[node_id].write() = neighbors;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_to_cover_new_node() {
        let mut layer = Layer::new(2);
        layer.ensure_capacity(5);
        assert_eq!(layer.get_neighbors(5), Vec::<NodeId>::new());
    }

    #[test]
    fn set_then_get_round_trips() {
        let layer = Layer::new(4);
        layer.set_neighbors(1, vec![0, 2, 3]);
        assert_eq!(layer.get_neighbors(1), vec![0, 2, 3]);
    }
}
