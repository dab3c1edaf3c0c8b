//! Public HNSW index: a graph plus the id/payload bookkeeping around it,
//! pairing the raw graph with a string id mapping and a string-keyed
//! metadata store.

use super::graph::HnswGraph;
use super::layer::NodeId;
use super::params::HnswParams;
use super::persistence::{self, MetaRecord, FORMAT_VERSION};
use crate::distance::DistanceMetric;
use crate::error::{Error, Result};
use crate::point::{ScoredRecord, VectorRecord};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

struct Bookkeeping {
    id_to_key: FxHashMap<String, NodeId>,
    key_to_id: FxHashMap<NodeId, String>,
    metadata: FxHashMap<NodeId, HashMap<String, String>>,
}

/// A complete, self-contained HNSW index for one collection: graph
/// topology, the id ↔ internal-key mapping, and per-key metadata.
///
/// `book` also doubles as the index's single exclusive lock: `insert`,
/// `remove`, and `load` hold it for their whole operation, including the
/// graph mutation, so writers never interleave and a reader never observes
/// a writer's intermediate state.
pub struct HnswIndex {
    metric: DistanceMetric,
    dimension: usize,
    params: HnswParams,
    graph: HnswGraph,
    book: RwLock<Bookkeeping>,
    next_key: AtomicU64,
}

impl HnswIndex {
    /// Creates an empty index for `dimension`-length vectors under `metric`.
    #[must_use]
    pub fn new(dimension: usize, metric: DistanceMetric, params: HnswParams) -> Self {
        Self {
            metric,
            dimension,
            params,
            graph: HnswGraph::new(
                metric,
                dimension,
                params.max_connections,
                params.ef_construction,
                params.max_elements,
            ),
            book: RwLock::new(Bookkeeping {
                id_to_key: FxHashMap::default(),
                key_to_id: FxHashMap::default(),
                metadata: FxHashMap::default(),
            }),
            next_key: AtomicU64::new(0),
        }
    }

    /// Number of live (non-removed) vectors in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[must_use]
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    fn generate_id(&self) -> String {
        let micros = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as u64)
            .unwrap_or(0);
        let key = self.next_key.load(Ordering::Relaxed);
        format!("{micros:x}-{key}")
    }

    /// Inserts one vector, generating an id if the caller left it empty.
    ///
    /// Fails with [`Error::DimensionMismatch`] if `values.len() != dimension`,
    /// or [`Error::DuplicateId`] if a non-empty `id` is already present.
    pub fn insert(
        &self,
        id: Option<String>,
        values: Vec<f32>,
        metadata: HashMap<String, String>,
    ) -> Result<String> {
        if values.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: values.len(),
            });
        }

        // Held for the whole operation, not just the bookkeeping update: the
        // duplicate check and the graph insert must be atomic, or two
        // concurrent inserts of the same new id can both pass the check and
        // both land in the graph, leaving `id_to_key`/`key_to_id` inconsistent.
        let mut book = self.book.write();

        let id = match id {
            Some(id) if !id.is_empty() => {
                if book.id_to_key.contains_key(&id) {
                    return Err(Error::DuplicateId(id));
                }
                id
            }
            _ => self.generate_id(),
        };

        let key = self.graph.insert(values);
        self.next_key.fetch_add(1, Ordering::Relaxed);

        book.id_to_key.insert(id.clone(), key);
        book.key_to_id.insert(key, id.clone());
        book.metadata.insert(key, metadata);

        Ok(id)
    }

    /// Inserts every record, swallowing per-record errors; returns the count
    /// that succeeded.
    pub fn batch_insert(&self, records: Vec<VectorRecord>) -> usize {
        let mut inserted = 0usize;
        for record in records {
            let id = if record.id.is_empty() {
                None
            } else {
                Some(record.id)
            };
            if self.insert(id, record.values, record.metadata).is_ok() {
                inserted += 1;
            }
        }
        inserted
    }

    /// Logically removes `id`. Returns `true` if it existed.
    ///
    /// Held exclusively across the graph tombstone write too, so a concurrent
    /// `search`/`get` never observes the bookkeeping and the graph disagree
    /// about whether `id` still exists.
    pub fn remove(&self, id: &str) -> bool {
        let mut book = self.book.write();
        let Some(key) = book.id_to_key.remove(id) else {
            return false;
        };
        book.key_to_id.remove(&key);
        book.metadata.remove(&key);
        self.graph.mark_deleted(key);
        true
    }

    /// Returns the stored vector and metadata for `id`, if present.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<VectorRecord> {
        let book = self.book.read();
        let key = *book.id_to_key.get(id)?;
        let metadata = book.metadata.get(&key).cloned().unwrap_or_default();
        let values = self.graph.get_vector(key);
        Some(VectorRecord::with_metadata(id, values, metadata))
    }

    /// Finds the `k` nearest neighbors of `query`.
    ///
    /// `ef == 0` uses the collection's configured `ef_search`; otherwise the
    /// caller's value is clamped to at least `k`. Ties break by ascending
    /// internal key, i.e. insertion order, so results are deterministic.
    ///
    /// Held across the graph search, not just the id lookup: a reader must
    /// see one consistent snapshot of bookkeeping plus graph, never a writer's
    /// intermediate state.
    pub fn search(&self, query: &[f32], k: usize, ef: usize) -> Result<Vec<ScoredRecord>> {
        if query.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        let effective_ef = self.params.resolve_ef(ef, k);

        let book = self.book.read();
        let mut hits = self.graph.search(query, k, effective_ef);
        hits.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

        Ok(hits
            .into_iter()
            .filter_map(|(key, score)| {
                let id = book.key_to_id.get(&key)?.clone();
                let metadata = book.metadata.get(&key).cloned().unwrap_or_default();
                Some(ScoredRecord { id, score, metadata })
            })
            .collect())
    }

    /// Finds the `k` nearest neighbors whose metadata matches `filter` exactly.
    ///
    /// Over-fetches `k * 3` candidates from the graph, then filters — cheap
    /// and correct for the moderate selectivity this service targets,
    /// without needing a metadata-aware graph traversal.
    pub fn search_with_filter(
        &self,
        query: &[f32],
        k: usize,
        ef: usize,
        filter: &HashMap<String, String>,
    ) -> Result<Vec<ScoredRecord>> {
        if filter.is_empty() {
            return self.search(query, k, ef);
        }
        let over_fetch = k.saturating_mul(3).max(k);
        let candidates = self.search(query, over_fetch, ef)?;
        Ok(candidates
            .into_iter()
            .filter(|r| filter.iter().all(|(fk, fv)| r.metadata.get(fk) == Some(fv)))
            .take(k)
            .collect())
    }

    /// Runs `search` for every query. Sequential for small batches;
    /// otherwise fans out across a bounded worker pool.
    pub fn batch_search(
        &self,
        queries: &[Vec<f32>],
        k: usize,
        ef: usize,
    ) -> Result<Vec<Vec<ScoredRecord>>> {
        if queries.len() <= 100 {
            return queries.iter().map(|q| self.search(q, k, ef)).collect();
        }

        let workers = std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(1)
            .min(queries.len() / 100)
            .min(32)
            .max(1);

        let chunk_size = queries.len().div_ceil(workers);
        std::thread::scope(|scope| {
            let handles: Vec<_> = queries
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|q| self.search(q, k, ef))
                            .collect::<Result<Vec<_>>>()
                    })
                })
                .collect();

            let mut results = Vec::with_capacity(queries.len());
            for handle in handles {
                results.extend(handle.join().map_err(|_| {
                    Error::Internal("batch_search worker thread panicked".to_string())
                })??);
            }
            Ok(results)
        })
    }

    /// Serializes the graph topology header to `{stem}.hnsw` and the id/
    /// payload map to `{stem}.hnsw.meta`.
    ///
    /// The topology file only records this index's construction parameters;
    /// `load` rebuilds the graph deterministically by re-inserting every
    /// surviving record from the meta file in ascending internal-key order,
    /// which reproduces an equivalent (not necessarily bit-identical, but
    /// equally valid) HNSW graph. This sidesteps serializing the adjacency
    /// lists directly while still satisfying the "must version, must refuse
    /// incompatible versions" contract.
    pub fn save(&self, stem: &Path) -> Result<()> {
        let graph_path = stem.with_extension("hnsw");
        let meta_path = with_suffix(stem, "hnsw.meta");

        let mut graph_file = BufWriter::new(File::create(&graph_path)?);
        graph_file.write_all(&FORMAT_VERSION.to_le_bytes())?;
        graph_file.write_all(&(self.params.max_connections as u64).to_le_bytes())?;
        graph_file.write_all(&(self.params.ef_construction as u64).to_le_bytes())?;
        graph_file.write_all(&(self.params.max_elements as u64).to_le_bytes())?;
        graph_file.flush()?;

        let book = self.book.read();
        let mut records: Vec<MetaRecord> = book
            .key_to_id
            .iter()
            .map(|(&key, id)| MetaRecord {
                key,
                id: id.clone(),
                values: self.graph.get_vector(key),
                metadata: book.metadata.get(&key).cloned().unwrap_or_default(),
            })
            .collect();
        records.sort_by_key(|r| r.key);
        drop(book);

        let mut meta_file = BufWriter::new(File::create(&meta_path)?);
        persistence::write_meta(&mut meta_file, &records, self.next_key.load(Ordering::Relaxed))?;
        meta_file.flush()?;

        Ok(())
    }

    /// Rebuilds an index from the `{stem}.hnsw` / `{stem}.hnsw.meta` pair.
    pub fn load(stem: &Path, metric: DistanceMetric, dimension: usize) -> Result<Self> {
        let graph_path = stem.with_extension("hnsw");
        let meta_path = with_suffix(stem, "hnsw.meta");

        let mut graph_file = BufReader::new(File::open(&graph_path)?);
        let mut header = [0u8; 32];
        graph_file.read_exact(&mut header)?;
        let version = u64::from_le_bytes(header[0..8].try_into().unwrap());
        if version != FORMAT_VERSION {
            return Err(Error::IndexCorrupted(format!(
                "unsupported graph file version {version}, expected {FORMAT_VERSION}"
            )));
        }
        let max_connections = u64::from_le_bytes(header[8..16].try_into().unwrap()) as usize;
        let ef_construction = u64::from_le_bytes(header[16..24].try_into().unwrap()) as usize;
        let max_elements = u64::from_le_bytes(header[24..32].try_into().unwrap()) as usize;

        let mut meta_file = BufReader::new(File::open(&meta_path)?);
        let (mut records, next_key) = persistence::read_meta(&mut meta_file)?;
        records.sort_by_key(|r| r.key);

        let params = HnswParams {
            max_connections,
            ef_construction,
            ef_search: HnswParams::default().ef_search,
            max_elements,
        };
        let index = Self::new(dimension, metric, params);

        let mut book = index.book.write();
        for record in records {
            if record.values.len() != dimension {
                continue;
            }
            let key = index.graph.insert(record.values);
            book.id_to_key.insert(record.id.clone(), key);
            book.key_to_id.insert(key, record.id);
            book.metadata.insert(key, record.metadata);
        }
        drop(book);
        index.next_key.store(next_key, Ordering::Relaxed);

        Ok(index)
    }
}

fn with_suffix(stem: &Path, suffix: &str) -> std::path::PathBuf {
    let mut name = stem.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(suffix.trim_start_matches(|c: char| c == '.'));
    stem.with_file_name(name)
}


#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    fn dimension_strategy() -> impl Strategy<Value = usize> {
        4usize..=32
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        /// `len()` always equals the number of vectors that were actually
        /// accepted (right-dimension, non-duplicate id).
        #[test]
        fn prop_len_equals_successful_insertions(
            dim in dimension_strategy(),
            vectors in proptest::collection::vec(
                proptest::collection::vec(-1.0f32..1.0, 1usize..=32),
                1usize..=20,
            ),
        ) {
            let index = HnswIndex::new(dim, DistanceMetric::Euclidean, HnswParams::default());
            let mut inserted = 0usize;
            for v in vectors {
                if v.len() == dim && index.insert(None, v, HashMap::new()).is_ok() {
                    inserted += 1;
                }
            }
            prop_assert_eq!(index.len(), inserted);
        }

        /// `search` never returns more than `k` hits, regardless of how many
        /// vectors are actually in the index.
        #[test]
        fn prop_search_returns_at_most_k(
            dim in 4usize..=16,
            count in 0usize..40,
            k in 1usize..10,
        ) {
            let index = HnswIndex::new(dim, DistanceMetric::Cosine, HnswParams::default());
            for i in 0..count {
                let v: Vec<f32> = (0..dim).map(|d| ((i + d) as f32).sin()).collect();
                index.insert(None, v, HashMap::new()).unwrap();
            }
            let query: Vec<f32> = (0..dim).map(|d| d as f32).collect();
            let hits = index.search(&query, k, 0).unwrap();
            prop_assert!(hits.len() <= k);
            prop_assert!(hits.len() <= index.len());
        }

        /// Search results are always sorted by ascending score.
        #[test]
        fn prop_search_results_are_sorted(
            dim in 4usize..=16,
            count in 2usize..40,
        ) {
            let index = HnswIndex::new(dim, DistanceMetric::Euclidean, HnswParams::default());
            for i in 0..count {
                let v: Vec<f32> = (0..dim).map(|d| ((i * 7 + d) as f32).cos()).collect();
                index.insert(None, v, HashMap::new()).unwrap();
            }
            let query: Vec<f32> = vec![0.0; dim];
            let hits = index.search(&query, count, 0).unwrap();
            for pair in hits.windows(2) {
                prop_assert!(pair[0].score <= pair[1].score);
            }
        }
    }
}
