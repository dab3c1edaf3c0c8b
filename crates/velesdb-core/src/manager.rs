//! The collection registry: creates, drops, lists, and delegates
//! per-vector operations to the collections it owns.
//!
//! Collections live behind `HashMap<String, Arc<Collection>>` rather than
//! owned directly, so a per-vector operation can release the registry lock
//! before touching the collection's own lock. The two locks are never held
//! in reverse order.

use crate::collection::{Collection, CollectionConfig};
use crate::distance::DistanceMetric;
use crate::error::{Error, Result};
use crate::index::hnsw::HnswIndex;
use crate::point::{ScoredRecord, VectorRecord};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Snapshot of a collection's size and configuration, for the stats endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionStats {
    /// Collection name.
    pub name: String,
    /// Number of live vectors.
    pub count: usize,
    /// Vector dimension.
    pub dimension: usize,
    /// Configured distance metric.
    pub metric: DistanceMetric,
    /// Rough resident memory estimate: `count * dimension * 4` bytes for the
    /// raw vector data, not counting graph adjacency or metadata overhead.
    pub memory_bytes: usize,
}

/// Owns every collection in the service and the on-disk directory they persist to.
pub struct CollectionManager {
    data_dir: PathBuf,
    registry: RwLock<HashMap<String, Arc<Collection>>>,
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(Error::BadRequest(format!(
            "invalid collection name '{name}'"
        )));
    }
    Ok(())
}

impl CollectionManager {
    /// Opens (creating if necessary) the manager over `data_dir`, then loads
    /// every collection found there.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        let manager = Self {
            data_dir,
            registry: RwLock::new(HashMap::new()),
        };
        manager.load_all();
        Ok(manager)
    }

    fn config_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{name}.json"))
    }

    fn index_stem(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    /// Creates a new empty collection, persisting its config sidecar immediately.
    ///
    /// Returns `false` without error if `config.name` already exists.
    pub fn create(&self, config: CollectionConfig) -> Result<bool> {
        validate_name(&config.name)?;
        let mut registry = self.registry.write();
        if registry.contains_key(&config.name) {
            return Ok(false);
        }

        let path = self.config_path(&config.name);
        let text = serde_json::to_string_pretty(&config)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        std::fs::write(&path, text)?;

        let name = config.name.clone();
        registry.insert(name, Arc::new(Collection::new(config)));
        Ok(true)
    }

    /// Removes a collection from memory and deletes its on-disk files.
    ///
    /// Returns `false` if the name was unknown.
    pub fn drop_collection(&self, name: &str) -> Result<bool> {
        let mut registry = self.registry.write();
        if registry.remove(name).is_none() {
            return Ok(false);
        }

        for path in [
            self.config_path(name),
            self.index_stem(name).with_extension("hnsw"),
            with_meta_suffix(&self.index_stem(name)),
        ] {
            if path.exists() {
                std::fs::remove_file(path)?;
            }
        }
        Ok(true)
    }

    /// Lists every known collection name.
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        self.registry.read().keys().cloned().collect()
    }

    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        self.registry.read().contains_key(name)
    }

    fn get(&self, name: &str) -> Result<Arc<Collection>> {
        self.registry
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::CollectionNotFound(name.to_string()))
    }

    /// Returns size and configuration stats for `name`.
    pub fn stats(&self, name: &str) -> Result<CollectionStats> {
        let collection = self.get(name)?;
        let count = collection.index().len();
        Ok(CollectionStats {
            name: name.to_string(),
            count,
            dimension: collection.config().dimension,
            metric: collection.config().metric,
            memory_bytes: count * collection.config().dimension * std::mem::size_of::<f32>(),
        })
    }

    /// Inserts one vector into `collection_name`.
    pub fn insert(
        &self,
        collection_name: &str,
        record: VectorRecord,
    ) -> Result<String> {
        let collection = self.get(collection_name)?;
        let id = if record.id.is_empty() {
            None
        } else {
            Some(record.id)
        };
        collection.index().insert(id, record.values, record.metadata)
    }

    /// Inserts every record into `collection_name`, swallowing per-record errors.
    pub fn batch_insert(&self, collection_name: &str, records: Vec<VectorRecord>) -> Result<usize> {
        let collection = self.get(collection_name)?;
        Ok(collection.index().batch_insert(records))
    }

    /// Removes a vector by id from `collection_name`.
    pub fn remove(&self, collection_name: &str, id: &str) -> Result<bool> {
        let collection = self.get(collection_name)?;
        Ok(collection.index().remove(id))
    }

    /// Fetches a vector by id from `collection_name`.
    pub fn get_vector(&self, collection_name: &str, id: &str) -> Result<Option<VectorRecord>> {
        let collection = self.get(collection_name)?;
        Ok(collection.index().get(id))
    }

    /// Searches `collection_name` for the `k` nearest neighbors of `query`.
    pub fn search(
        &self,
        collection_name: &str,
        query: &[f32],
        k: usize,
        ef: usize,
    ) -> Result<Vec<ScoredRecord>> {
        let collection = self.get(collection_name)?;
        collection.index().search(query, k, ef)
    }

    /// Searches with an exact-match metadata filter, over-fetching before filtering.
    pub fn search_with_filter(
        &self,
        collection_name: &str,
        query: &[f32],
        k: usize,
        ef: usize,
        filter: &HashMap<String, String>,
    ) -> Result<Vec<ScoredRecord>> {
        let collection = self.get(collection_name)?;
        collection.index().search_with_filter(query, k, ef, filter)
    }

    /// Runs `search` for each query against `collection_name`.
    pub fn batch_search(
        &self,
        collection_name: &str,
        queries: &[Vec<f32>],
        k: usize,
        ef: usize,
    ) -> Result<Vec<Vec<ScoredRecord>>> {
        let collection = self.get(collection_name)?;
        collection.index().batch_search(queries, k, ef)
    }

    /// Saves one collection's config and index to disk.
    pub fn save_one(&self, name: &str) -> Result<()> {
        let collection = self.get(name)?;
        let text = serde_json::to_string_pretty(collection.config())
            .map_err(|e| Error::Serialization(e.to_string()))?;
        std::fs::write(self.config_path(name), text)?;
        collection.index().save(&self.index_stem(name))?;
        debug!(collection = name, "saved collection to disk");
        Ok(())
    }

    /// Saves every collection, returning the number saved successfully.
    /// A single collection's save failure is logged and does not abort the rest.
    pub fn save_all(&self) -> usize {
        let names = self.list();
        let mut saved = 0usize;
        for name in names {
            match self.save_one(&name) {
                Ok(()) => saved += 1,
                Err(err) => warn!(collection = %name, error = %err, "failed to save collection"),
            }
        }
        saved
    }

    /// Scans `data_dir` for config sidecars and reconstructs each collection,
    /// loading its paired binary files if present or starting empty otherwise.
    /// A single collection's load failure is logged and does not abort the rest.
    pub fn load_all(&self) {
        let Ok(entries) = std::fs::read_dir(&self.data_dir) else {
            return;
        };

        let mut registry = self.registry.write();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            match self.load_one(name, &path) {
                Ok(collection) => {
                    registry.insert(name.to_string(), Arc::new(collection));
                    info!(collection = name, "loaded collection");
                }
                Err(err) => {
                    warn!(collection = name, error = %err, "failed to load collection, skipping");
                }
            }
        }
    }

    fn load_one(&self, name: &str, config_path: &Path) -> Result<Collection> {
        let text = std::fs::read_to_string(config_path)?;
        let config: CollectionConfig =
            serde_json::from_str(&text).map_err(|e| Error::Serialization(e.to_string()))?;

        let stem = self.index_stem(name);
        let graph_path = stem.with_extension("hnsw");
        let meta_path = with_meta_suffix(&stem);

        if graph_path.exists() && meta_path.exists() {
            let index = HnswIndex::load(&stem, config.metric, config.dimension)?;
            Ok(Collection::from_parts(config, index))
        } else {
            Ok(Collection::new(config))
        }
    }
}

fn with_meta_suffix(stem: &Path) -> PathBuf {
    let mut name = stem.file_name().unwrap_or_default().to_os_string();
    name.push(".hnsw.meta");
    stem.with_file_name(name)
}
