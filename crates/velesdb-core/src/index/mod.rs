//! Index implementations. Currently just HNSW; the module boundary exists
//! so an alternate index type could be added without touching the
//! collection manager's public surface.

pub mod hnsw;
