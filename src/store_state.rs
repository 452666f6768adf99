use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, info};
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::app_response::AppResponse;
use crate::config::StoreConfig;
use crate::doc_model::{DocumentReference, DocumentSnapshot, Fields, QuerySnapshot, StoredDocument};
use crate::id_generator::{Clock, DocumentIdGenerator, SystemClock};
use crate::seed::seed_sample_data;

struct StoreInner {
    collections: RwLock<HashMap<String, Vec<StoredDocument>>>,
    ids: DocumentIdGenerator,
    config: StoreConfig,
}

/// In-memory document store.
///
/// Collections are named, ordered lists of documents, created on first
/// write and kept for the lifetime of the store. Cloning a `MemoryStore`
/// yields another handle onto the same collections, which is how screens,
/// services and pollers share one store.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<StoreInner>,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("collections", &self.collection_names())
            .field("config", &self.inner.config)
            .finish()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Empty store on the system clock with default settings and no sample data.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self::build(clock, StoreConfig::default())
    }

    /// Creates a store from `config`, seeding the sample records when asked to.
    pub fn from_config(config: StoreConfig) -> Result<Self, AppResponse> {
        Self::from_config_with_clock(config, Arc::new(SystemClock))
    }

    pub fn from_config_with_clock(config: StoreConfig, clock: Arc<dyn Clock>) -> Result<Self, AppResponse> {
        config.validate()?;
        let seed = config.seed_sample_data;
        let store = Self::build(clock, config);
        info!("Document store created (seed sample data: {seed})");

        if seed {
            seed_sample_data(&store)?;
        }
        Ok(store)
    }

    fn build(clock: Arc<dyn Clock>, config: StoreConfig) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                collections: RwLock::new(HashMap::new()),
                ids: DocumentIdGenerator::new(clock),
                config,
            }),
        }
    }

    /// Handle onto the collection named `name`.
    ///
    /// Any string is a valid name. Slash-separated paths such as
    /// `chats/room1/messages` name one flat collection keyed by the literal
    /// string; see [`crate::collection_path::CollectionPath`] for building them.
    pub fn collection(&self, name: impl AsRef<str>) -> CollectionRef {
        CollectionRef {
            store: self.clone(),
            name: name.as_ref().to_string(),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        self.inner.ids.clock()
    }

    /// Names of every collection that has received at least one document, sorted.
    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn document_count(&self, name: &str) -> usize {
        self.read().get(name).map_or(0, Vec::len)
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Vec<StoredDocument>>> {
        self.inner.collections.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Vec<StoredDocument>>> {
        self.inner.collections.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A named collection inside a [`MemoryStore`].
#[derive(Debug, Clone)]
pub struct CollectionRef {
    store: MemoryStore,
    name: String,
}

impl CollectionRef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Appends a document and returns its generated id.
    ///
    /// The id is assigned under the write lock, so id order always matches
    /// insertion order.
    pub fn add(&self, fields: Fields) -> DocumentReference {
        let mut collections = self.store.write();
        let id = self.store.inner.ids.next_id();
        debug!("Adding document {id} to '{}' ({} fields)", self.name, fields.len());

        collections
            .entry(self.name.clone())
            .or_default()
            .push(StoredDocument {
                id: id.clone(),
                fields,
            });
        DocumentReference { id }
    }

    /// Serializes `record` and adds it. The record must serialize to a JSON object.
    pub fn add_record<T: Serialize + ?Sized>(&self, record: &T) -> Result<DocumentReference, AppResponse> {
        match serde_json::to_value(record)? {
            JsonValue::Object(fields) => Ok(self.add(fields)),
            other => Err(AppResponse::ValidationError(format!(
                "Documents must be JSON objects, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Snapshot of every document in insertion order. Unknown collections are empty.
    pub fn get(&self) -> QuerySnapshot {
        let collections = self.store.read();
        let docs = collections
            .get(&self.name)
            .map(|docs| docs.iter().map(DocumentSnapshot::from_stored).collect())
            .unwrap_or_default();
        QuerySnapshot { docs }
    }

    pub fn len(&self) -> usize {
        self.store.document_count(&self.name)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub(crate) fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
