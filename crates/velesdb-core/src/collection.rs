//! A named collection: its configuration plus the HNSW index backing it.

use crate::distance::DistanceMetric;
use crate::index::hnsw::{HnswIndex, HnswParams};
use serde::{Deserialize, Serialize};

/// Persisted collection configuration: the `{name}.json` sidecar.
///
/// `metric` round-trips through a fixed integer encoding
/// (`0=Euclidean, 1=Cosine, 2=DotProduct`) via the [`metric_code`]
/// module so the sidecar stays stable across a future `DistanceMetric`
/// variant reordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Collection name; also the on-disk filename stem.
    pub name: String,
    /// Vector dimension every record in this collection must match.
    pub dimension: usize,
    /// Distance metric used for all searches.
    #[serde(rename = "metric_int", with = "metric_code")]
    pub metric: DistanceMetric,
    /// `M`: bi-directional links per node.
    #[serde(rename = "M")]
    pub m: usize,
    /// Construction-time beam width.
    pub ef_construction: usize,
    /// Default search-time beam width.
    pub ef_search: usize,
    /// Sidecar format version, bumped if the JSON schema changes incompatibly.
    #[serde(default = "default_version")]
    pub version: u8,
}

fn default_version() -> u8 {
    1
}

/// Serializes/deserializes [`DistanceMetric`] as a fixed integer code
/// (`0=Euclidean, 1=Cosine, 2=DotProduct`), independent of the enum's
/// declaration order.
mod metric_code {
    use crate::distance::DistanceMetric;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub(super) fn serialize<S: Serializer>(
        metric: &DistanceMetric,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let code: u8 = match metric {
            DistanceMetric::Euclidean => 0,
            DistanceMetric::Cosine => 1,
            DistanceMetric::InnerProduct => 2,
        };
        code.serialize(serializer)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DistanceMetric, D::Error> {
        let code = u8::deserialize(deserializer)?;
        match code {
            0 => Ok(DistanceMetric::Euclidean),
            1 => Ok(DistanceMetric::Cosine),
            2 => Ok(DistanceMetric::InnerProduct),
            other => Err(serde::de::Error::custom(format!(
                "invalid metric_int value {other}"
            ))),
        }
    }
}

impl CollectionConfig {
    /// Builds a config from the caller-facing create-collection fields,
    /// falling back to [`HnswParams::default`] for any omitted HNSW knob.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        dimension: usize,
        metric: DistanceMetric,
        m: Option<usize>,
        ef_construction: Option<usize>,
        ef_search: Option<usize>,
    ) -> Self {
        let defaults = HnswParams::default();
        Self {
            name: name.into(),
            dimension,
            metric,
            m: m.unwrap_or(defaults.max_connections),
            ef_construction: ef_construction.unwrap_or(defaults.ef_construction),
            ef_search: ef_search.unwrap_or(defaults.ef_search),
            version: 1,
        }
    }

    #[must_use]
    pub(crate) fn hnsw_params(&self) -> HnswParams {
        HnswParams {
            max_connections: self.m,
            ef_construction: self.ef_construction,
            ef_search: self.ef_search,
            max_elements: HnswParams::default().max_elements,
        }
    }
}

/// A collection: its configuration and the live index behind it.
pub struct Collection {
    pub(crate) config: CollectionConfig,
    pub(crate) index: HnswIndex,
}

impl Collection {
    /// Creates a new, empty collection from `config`.
    #[must_use]
    pub fn new(config: CollectionConfig) -> Self {
        let index = HnswIndex::new(config.dimension, config.metric, config.hnsw_params());
        Self { config, index }
    }

    /// Wraps an already-constructed config and index, as produced by loading from disk.
    pub(crate) fn from_parts(config: CollectionConfig, index: HnswIndex) -> Self {
        Self { config, index }
    }

    #[must_use]
    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    #[must_use]
    pub fn index(&self) -> &HnswIndex {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_falls_back_to_hnsw_defaults() {
        let config = CollectionConfig::new("docs", 128, DistanceMetric::Cosine, None, None, None);
        assert_eq!(config.m, 16);
        assert_eq!(config.ef_construction, 200);
        assert_eq!(config.ef_search, 50);
    }

    #[test]
    fn config_honors_overrides() {
        let config = CollectionConfig::new(
            "docs",
            128,
            DistanceMetric::Cosine,
            Some(32),
            Some(400),
            Some(100),
        );
        assert_eq!(config.m, 32);
        assert_eq!(config.ef_construction, 400);
        assert_eq!(config.ef_search, 100);
    }
}
