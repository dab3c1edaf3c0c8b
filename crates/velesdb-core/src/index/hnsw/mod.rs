//! HNSW (Hierarchical Navigable Small World) vector index.

mod graph;
mod index;
mod layer;
mod ordered_float;
mod params;
mod persistence;

pub use index::HnswIndex;
pub use params::HnswParams;
