//! Document-store abstraction for Listy City.
//!
//! This module provides the boundary between the controller and whatever
//! holds the collection (an in-process store, a JSON file, a remote
//! database client).
//!
//! # Design
//!
//! The store trait is async and collection-oriented:
//! - `listen()` registers a sink that receives a full snapshot right away
//!   and again after every change
//! - `remove_listener()` releases that registration synchronously
//! - `add()` creates a document and returns its generated id
//! - `set()` overwrites every field of a document
//! - `delete()` removes a document
//!
//! # Example
//!
//! ```ignore
//! let store = MemoryStore::new();
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! let listener = store.listen("cities", tx).await?;
//! let id = store.add("cities", City::new("Regina", "Saskatchewan").to_persistable()).await?;
//! store.remove_listener(listener);
//! ```

mod file;
mod memory;

pub use file::FileStore;
pub use memory::{Collections, MemoryStore};

use async_trait::async_trait;
use city_types::{Fields, Snapshot};
use std::fmt;
use thiserror::Error;
use tokio::sync::mpsc;

/// Store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The caller may not read or write the collection.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The store cannot be reached.
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// The addressed document does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Local persistence failed.
    #[error("io error: {0}")]
    Io(String),

    /// Stored data could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The store refused the request.
    #[error("rejected: {0}")]
    Rejected(String),
}

/// One delivery to a listener: a snapshot or the error that replaced it.
pub type SnapshotEvent = Result<Snapshot, StoreError>;

/// Sending half handed to [`DocumentStore::listen`].
pub type SnapshotSink = mpsc::UnboundedSender<SnapshotEvent>;

/// Handle identifying a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Wrap a raw listener number.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Document store holding named collections.
///
/// Implementations deliver snapshots in collection order and never retry a
/// failed write.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Register a sink for snapshots of `collection`.
    ///
    /// The current snapshot is delivered before this returns.
    async fn listen(&self, collection: &str, sink: SnapshotSink)
        -> Result<ListenerId, StoreError>;

    /// Release a listener. Unknown ids are ignored.
    fn remove_listener(&self, listener: ListenerId);

    /// Create a document and return its store-assigned id.
    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError>;

    /// Replace every field of the document at `id`.
    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError>;

    /// Remove the document at `id`.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;
}
