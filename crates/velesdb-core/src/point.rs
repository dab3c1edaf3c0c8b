//! The unit of data stored in a collection.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single vector together with its caller-supplied id and metadata.
///
/// Metadata is a flat `HashMap<String, String>` rather than an arbitrary
/// JSON value, so filtering stays exact string equality per key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorRecord {
    /// Caller-supplied or server-generated unique id, scoped to the owning collection.
    pub id: String,
    /// The embedding itself.
    pub values: Vec<f32>,
    /// Arbitrary string key/value metadata attached to the vector.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl VectorRecord {
    /// Builds a record with no metadata.
    #[must_use]
    pub fn new(id: impl Into<String>, values: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            values,
            metadata: HashMap::new(),
        }
    }

    /// Builds a record with metadata attached.
    #[must_use]
    pub fn with_metadata(
        id: impl Into<String>,
        values: Vec<f32>,
        metadata: HashMap<String, String>,
    ) -> Self {
        Self {
            id: id.into(),
            values,
            metadata,
        }
    }

}

/// A scored search hit: a record together with its distance from the query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredRecord {
    /// The matched record's id.
    pub id: String,
    /// Distance from the query under the collection's configured metric (lower is closer).
    pub score: f32,
    /// The matched record's metadata, echoed back for convenience.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}
