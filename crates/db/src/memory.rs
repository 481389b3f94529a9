use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::collection::Collection;
use crate::error::{StoreError, StoreResult};
use crate::query::{Filter, Query};
use crate::record::{Record, RecordId};

type FieldIndex = HashMap<String, BTreeSet<RecordId>>;

struct State<R> {
    records: BTreeMap<RecordId, R>,
    indexes: HashMap<&'static str, FieldIndex>,
}

impl<R: Record> State<R> {
    fn new() -> Self {
        Self {
            records: BTreeMap::new(),
            indexes: R::INDEXES
                .iter()
                .map(|field| (*field, FieldIndex::new()))
                .collect(),
        }
    }

    fn put(&mut self, record: R) {
        for (field, index) in self.indexes.iter_mut() {
            for value in record.field(field) {
                index
                    .entry(value.to_string())
                    .or_default()
                    .insert(record.id().clone());
            }
        }
        self.records.insert(record.id().clone(), record);
    }

    fn take(&mut self, id: &RecordId) -> Option<R> {
        let record = self.records.remove(id)?;
        for (field, index) in self.indexes.iter_mut() {
            for value in record.field(field) {
                if let Some(ids) = index.get_mut(value) {
                    ids.remove(id);
                    if ids.is_empty() {
                        index.remove(value);
                    }
                }
            }
        }
        Some(record)
    }

    fn matching(&self, filter: &Filter) -> Vec<&R> {
        if let Filter::Eq { field, value } = filter {
            if let Some(index) = self.indexes.get(field) {
                return index
                    .get(value)
                    .map(|ids| ids.iter().filter_map(|id| self.records.get(id)).collect())
                    .unwrap_or_default();
            }
        }

        self.records
            .values()
            .filter(|record| filter.matches(*record))
            .collect()
    }
}

/// In-memory collection with optional JSON snapshot persistence.
///
/// Snapshots are rewritten in full after every successful write while the
/// write lock is held, so the file on disk always reflects a whole state. A
/// write whose snapshot cannot be saved is undone in memory as well.
pub struct MemoryCollection<R> {
    state: RwLock<State<R>>,
    snapshot: Option<PathBuf>,
}

impl<R: Record> MemoryCollection<R> {
    /// A purely in-memory collection.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::new()),
            snapshot: None,
        }
    }

    /// Open the collection, loading `{data_dir}/{COLLECTION}.json` when a
    /// directory is given. A missing snapshot file means an empty collection.
    pub async fn open(data_dir: Option<&Path>) -> StoreResult<Self> {
        let Some(dir) = data_dir else {
            return Ok(Self::new());
        };

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| StoreError::Io {
                path: dir.to_path_buf(),
                source,
            })?;

        let path = dir.join(format!("{}.json", R::COLLECTION));
        let mut state = State::new();

        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let records: Vec<R> =
                    serde_json::from_slice(&bytes).map_err(|source| StoreError::Serialization {
                        collection: R::COLLECTION,
                        source,
                    })?;
                for record in records {
                    state.put(record);
                }
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => return Err(StoreError::Io { path, source }),
        }

        tracing::info!(
            target: "libris-db",
            collection = R::COLLECTION,
            records = state.records.len(),
            path = %path.display(),
            "collection opened"
        );

        Ok(Self {
            state: RwLock::new(state),
            snapshot: Some(path),
        })
    }

    fn check(record: &R) -> StoreResult<()> {
        record.check().map_err(|message| StoreError::Schema {
            collection: R::COLLECTION,
            message,
        })
    }

    async fn persist(&self, state: &State<R>) -> StoreResult<()> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };

        let records: Vec<&R> = state.records.values().collect();
        let bytes =
            serde_json::to_vec_pretty(&records).map_err(|source| StoreError::Serialization {
                collection: R::COLLECTION,
                source,
            })?;

        let staging = path.with_extension("json.tmp");
        tokio::fs::write(&staging, bytes)
            .await
            .map_err(|source| StoreError::Io {
                path: staging.clone(),
                source,
            })?;
        tokio::fs::rename(&staging, path)
            .await
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })
    }
}

impl<R: Record> Default for MemoryCollection<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Record> Collection<R> for MemoryCollection<R> {
    async fn find_by_id(&self, id: &RecordId) -> StoreResult<Option<R>> {
        Ok(self.state.read().await.records.get(id).cloned())
    }

    async fn find(&self, query: Query) -> StoreResult<Vec<R>> {
        let state = self.state.read().await;
        let mut records: Vec<R> = state
            .matching(&query.filter)
            .into_iter()
            .cloned()
            .collect();
        if let Some(sort) = query.sort {
            records.sort_by(|a, b| sort.compare(a, b));
        }
        Ok(records)
    }

    async fn count(&self, filter: Filter) -> StoreResult<usize> {
        Ok(self.state.read().await.matching(&filter).len())
    }

    async fn insert(&self, record: R) -> StoreResult<R> {
        Self::check(&record)?;

        let mut state = self.state.write().await;
        if state.records.contains_key(record.id()) {
            return Err(StoreError::DuplicateId {
                collection: R::COLLECTION,
                id: record.id().clone(),
            });
        }

        state.put(record.clone());
        if let Err(err) = self.persist(&state).await {
            state.take(record.id());
            return Err(err);
        }

        tracing::debug!(target: "libris-db", collection = R::COLLECTION, id = %record.id(), "record inserted");
        Ok(record)
    }

    async fn replace(&self, id: &RecordId, record: R) -> StoreResult<Option<R>> {
        if record.id() != id {
            return Err(StoreError::IdMismatch {
                collection: R::COLLECTION,
                expected: id.clone(),
                actual: record.id().clone(),
            });
        }
        Self::check(&record)?;

        let mut state = self.state.write().await;
        let Some(previous) = state.take(id) else {
            return Ok(None);
        };

        state.put(record.clone());
        if let Err(err) = self.persist(&state).await {
            state.take(id);
            state.put(previous);
            return Err(err);
        }

        tracing::debug!(target: "libris-db", collection = R::COLLECTION, id = %id, "record replaced");
        Ok(Some(record))
    }

    async fn delete(&self, id: &RecordId) -> StoreResult<Option<R>> {
        let mut state = self.state.write().await;
        let removed = state.take(id);
        if let Some(record) = &removed {
            if let Err(err) = self.persist(&state).await {
                state.put(record.clone());
                return Err(err);
            }
            tracing::debug!(target: "libris-db", collection = R::COLLECTION, id = %id, "record deleted");
        }
        Ok(removed)
    }
}
