//! # `velesdb-core`
//!
//! Multi-tenant, persistent, in-memory approximate nearest neighbor vector
//! search engine built on HNSW (Hierarchical Navigable Small World) graphs,
//! with SIMD-accelerated distance kernels and per-collection disk
//! persistence.
//!
//! ```rust,ignore
//! use velesdb_core::{CollectionManager, CollectionConfig, DistanceMetric, VectorRecord};
//!
//! let manager = CollectionManager::open("./data")?;
//! manager.create(CollectionConfig::new("docs", 3, DistanceMetric::Cosine, None, None, None))?;
//! manager.insert("docs", VectorRecord::new("v1", vec![0.1, 0.2, 0.3]))?;
//! let hits = manager.search("docs", &[0.1, 0.2, 0.3], 5, 0)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod collection;
pub mod config;
pub mod distance;
pub mod error;
pub mod index;
pub mod manager;
pub mod point;

pub use collection::{Collection, CollectionConfig};
pub use config::{CliOverrides, ServiceConfig};
pub use distance::{DistanceMetric, SimdTier};
pub use error::{Error, ErrorCategory, Result};
pub use index::hnsw::{HnswIndex, HnswParams};
pub use manager::{CollectionManager, CollectionStats};
pub use point::{ScoredRecord, VectorRecord};
