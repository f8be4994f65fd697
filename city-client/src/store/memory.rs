//! In-process document store.
//!
//! Holds collections in memory, pushes snapshots to listeners after every
//! change, and allows queueing ids and failures for tests.

use super::{DocumentStore, ListenerId, SnapshotSink, StoreError};
use async_trait::async_trait;
use city_types::{Document, Fields, Snapshot};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Collections keyed by name, documents in insertion order.
pub type Collections = BTreeMap<String, Vec<Document>>;

/// In-process document store.
///
/// Clones share state, so a test can keep one handle for inspection while
/// the controller owns another.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    collections: Collections,
    listeners: Vec<Listener>,
    next_listener: u64,
    queued_ids: VecDeque<String>,
    calls: usize,
    fail_next_listen: Option<StoreError>,
    fail_next_add: Option<StoreError>,
    fail_next_set: Option<StoreError>,
    fail_next_delete: Option<StoreError>,
}

#[derive(Debug)]
struct Listener {
    id: ListenerId,
    collection: String,
    sink: SnapshotSink,
}

impl MemoryStoreInner {
    fn snapshot(&self, collection: &str) -> Snapshot {
        self.collections.get(collection).cloned().unwrap_or_default()
    }

    /// Push the current snapshot of `collection` to its listeners, dropping
    /// listeners whose receiving half is gone.
    fn broadcast(&mut self, collection: &str) {
        let snapshot = self.snapshot(collection);
        self.listeners.retain(|l| {
            l.collection != collection || l.sink.send(Ok(snapshot.clone())).is_ok()
        });
    }

    fn next_id(&mut self) -> String {
        self.queued_ids
            .pop_front()
            .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string())
    }

    // Staging applies a write to a copy of the collections. Nothing is
    // visible until `commit`.

    fn stage_add(
        &mut self,
        collection: &str,
        fields: Fields,
    ) -> Result<(String, Collections), StoreError> {
        self.calls += 1;
        if let Some(error) = self.fail_next_add.take() {
            return Err(error);
        }

        let id = self.next_id();
        let mut staged = self.collections.clone();
        staged
            .entry(collection.to_string())
            .or_default()
            .push(Document::new(id.clone(), fields));
        Ok((id, staged))
    }

    fn stage_set(
        &mut self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<Collections, StoreError> {
        self.calls += 1;
        if let Some(error) = self.fail_next_set.take() {
            return Err(error);
        }

        let mut staged = self.collections.clone();
        let docs = staged.entry(collection.to_string()).or_default();
        match docs.iter_mut().find(|d| d.id == id) {
            Some(doc) => doc.fields = fields,
            // Overwrite semantics: setting an unknown id creates the document.
            None => docs.push(Document::new(id, fields)),
        }
        Ok(staged)
    }

    fn stage_delete(&mut self, collection: &str, id: &str) -> Result<Collections, StoreError> {
        self.calls += 1;
        if let Some(error) = self.fail_next_delete.take() {
            return Err(error);
        }

        let mut staged = self.collections.clone();
        if let Some(docs) = staged.get_mut(collection) {
            docs.retain(|d| d.id != id);
        }
        Ok(staged)
    }

    fn commit(&mut self, collection: &str, staged: Collections) {
        self.collections = staged;
        self.broadcast(collection);
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `collections`.
    pub fn from_collections(collections: Collections) -> Self {
        let store = Self::default();
        store.lock().collections = collections;
        store
    }

    fn lock(&self) -> MutexGuard<'_, MemoryStoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of every collection.
    pub fn export(&self) -> Collections {
        self.lock().collections.clone()
    }

    /// Current documents of one collection.
    pub fn documents(&self, collection: &str) -> Snapshot {
        self.lock().snapshot(collection)
    }

    /// Use `id` for the next `add()` instead of a random one.
    pub fn queue_next_id(&self, id: &str) {
        self.lock().queued_ids.push_back(id.to_string());
    }

    /// Number of `add`/`set`/`delete` calls received, including failed ones.
    pub fn call_count(&self) -> usize {
        self.lock().calls
    }

    /// Number of registered listeners whose receiving half is still alive.
    pub fn active_listeners(&self) -> usize {
        self.lock()
            .listeners
            .iter()
            .filter(|l| !l.sink.is_closed())
            .count()
    }

    /// Deliver `error` to every listener of `collection`.
    pub fn push_error(&self, collection: &str, error: StoreError) {
        let mut inner = self.lock();
        inner
            .listeners
            .retain(|l| l.collection != collection || l.sink.send(Err(error.clone())).is_ok());
    }

    /// Cause the next `listen()` to fail with the given error.
    pub fn fail_next_listen(&self, error: StoreError) {
        self.lock().fail_next_listen = Some(error);
    }

    /// Cause the next `add()` to fail with the given error.
    pub fn fail_next_add(&self, error: StoreError) {
        self.lock().fail_next_add = Some(error);
    }

    /// Cause the next `set()` to fail with the given error.
    pub fn fail_next_set(&self, error: StoreError) {
        self.lock().fail_next_set = Some(error);
    }

    /// Cause the next `delete()` to fail with the given error.
    pub fn fail_next_delete(&self, error: StoreError) {
        self.lock().fail_next_delete = Some(error);
    }

    /// Collections as they would be after an `add()`, plus the new id.
    pub(crate) fn stage_add(
        &self,
        collection: &str,
        fields: Fields,
    ) -> Result<(String, Collections), StoreError> {
        self.lock().stage_add(collection, fields)
    }

    /// Collections as they would be after a `set()`.
    pub(crate) fn stage_set(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<Collections, StoreError> {
        self.lock().stage_set(collection, id, fields)
    }

    /// Collections as they would be after a `delete()`.
    pub(crate) fn stage_delete(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Collections, StoreError> {
        self.lock().stage_delete(collection, id)
    }

    /// Install staged collections and notify listeners of `collection`.
    pub(crate) fn commit(&self, collection: &str, staged: Collections) {
        self.lock().commit(collection, staged);
    }
}

impl Clone for MemoryStore {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn listen(
        &self,
        collection: &str,
        sink: SnapshotSink,
    ) -> Result<ListenerId, StoreError> {
        let mut inner = self.lock();

        if let Some(error) = inner.fail_next_listen.take() {
            return Err(error);
        }

        inner.next_listener += 1;
        let id = ListenerId::new(inner.next_listener);

        // A closed sink here is not an error; the listener is pruned on the next broadcast.
        let _ = sink.send(Ok(inner.snapshot(collection)));
        inner.listeners.push(Listener {
            id,
            collection: collection.to_string(),
            sink,
        });
        Ok(id)
    }

    fn remove_listener(&self, listener: ListenerId) {
        self.lock().listeners.retain(|l| l.id != listener);
    }

    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let mut inner = self.lock();
        let (id, staged) = inner.stage_add(collection, fields)?;
        inner.commit(collection, staged);
        Ok(id)
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let staged = inner.stage_set(collection, id, fields)?;
        inner.commit(collection, staged);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let staged = inner.stage_delete(collection, id)?;
        inner.commit(collection, staged);
        Ok(())
    }
}
