//! # city-client
//!
//! Synchronization controller for Listy City.
//!
//! This is the library front-ends use to show and edit the city list.
//!
//! ## Features
//!
//! - **Live List**: The list mirrors the last snapshot the store delivered
//! - **No Optimistic Updates**: Writes only change the list via the snapshot they trigger
//! - **Store Abstraction**: Pluggable document store (in-memory, JSON file)
//! - **Pure State Machine**: Uses city-core for side-effect-free logic
//!
//! ## Example
//!
//! ```ignore
//! use city_client::{CityController, ControllerConfig, FileStore};
//!
//! let store = FileStore::open("cities.json").await?;
//! let controller = CityController::new(store, ControllerConfig::default());
//! controller.subscribe().await;
//!
//! controller.on_add_requested("Regina", "Saskatchewan");
//! let cities = controller.current();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod controller;
pub mod store;

pub use controller::{
    CityController, CityView, ControllerConfig, DEFAULT_COLLECTION, DEFAULT_NOTICE_CAPACITY,
};
pub use store::{
    Collections, DocumentStore, FileStore, ListenerId, MemoryStore, SnapshotEvent, SnapshotSink,
    StoreError,
};
