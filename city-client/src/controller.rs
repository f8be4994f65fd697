//! CityController - the synchronization controller for Listy City.
//!
//! This module provides [`CityController`], which mirrors one collection of
//! a [`DocumentStore`] into an in-memory list and turns user intents into
//! store writes.
//!
//! # Architecture
//!
//! The controller uses the pure list state machine and intent planning from
//! city-core and interprets their output to perform actual I/O via the
//! DocumentStore trait.
//!
//! ```text
//! Front-end → CityController → DocumentStore
//!     ↑             ↓               │
//!     │        city-core (pure)     │ snapshots
//!     └──── watch / broadcast ◄─────┘
//! ```
//!
//! Writes never touch the list. The list changes only when the store echoes
//! a snapshot back through the subscription.
//!
//! # Example
//!
//! ```ignore
//! use city_client::{CityController, ControllerConfig, MemoryStore};
//!
//! let controller = CityController::new(MemoryStore::new(), ControllerConfig::default());
//! let mut cities = controller.cities();
//! controller.subscribe().await;
//!
//! controller.add_record(Some(&City::new("Regina", "Saskatchewan"))).await;
//! cities.changed().await?;
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

use city_core::{
    plan_add, plan_delete, plan_update, Action, CityList, ListEvent, Notice, WritePlan,
};
use city_types::City;

use crate::store::{DocumentStore, ListenerId, SnapshotEvent};

/// Collection mirrored when none is configured.
pub const DEFAULT_COLLECTION: &str = "cities";

/// Default capacity of the notice channel.
pub const DEFAULT_NOTICE_CAPACITY: usize = 64;

/// Shared, immutable view of the rendered list.
pub type CityView = Arc<Vec<City>>;

/// Configuration for CityController.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Collection to mirror.
    pub collection: String,
    /// Notices buffered per receiver before the oldest are dropped.
    pub notice_capacity: usize,
}

impl ControllerConfig {
    /// Create a configuration for `collection`.
    pub fn new(collection: &str) -> Self {
        Self {
            collection: collection.to_string(),
            notice_capacity: DEFAULT_NOTICE_CAPACITY,
        }
    }

    /// Set the notice channel capacity.
    pub fn with_notice_capacity(mut self, capacity: usize) -> Self {
        self.notice_capacity = capacity.max(1);
        self
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_COLLECTION)
    }
}

/// The synchronization controller.
///
/// Clones share the same list, notice channel and subscription. The
/// subscription is released when [`CityController::unsubscribe`] is called or
/// when the last clone is dropped.
pub struct CityController<S: DocumentStore + 'static> {
    inner: Arc<Inner<S>>,
}

struct Inner<S: DocumentStore + 'static> {
    store: Arc<S>,
    collection: String,
    cities: Arc<watch::Sender<CityView>>,
    notices: broadcast::Sender<Notice>,
    subscription: Mutex<Option<Subscription<S>>>,
}

/// A live listener plus the task applying its snapshots.
///
/// Dropping it deregisters the listener and stops the task.
struct Subscription<S: DocumentStore + 'static> {
    store: Arc<S>,
    listener: ListenerId,
    pump: JoinHandle<()>,
}

impl<S: DocumentStore + 'static> Drop for Subscription<S> {
    fn drop(&mut self) {
        self.store.remove_listener(self.listener);
        self.pump.abort();
        tracing::debug!("Released {}", self.listener);
    }
}

impl<S: DocumentStore + 'static> CityController<S> {
    /// Create a controller. Nothing is subscribed until [`subscribe`](Self::subscribe).
    pub fn new(store: S, config: ControllerConfig) -> Self {
        let (cities, _) = watch::channel(CityView::default());
        let (notices, _) = broadcast::channel(config.notice_capacity);
        Self {
            inner: Arc::new(Inner {
                store: Arc::new(store),
                collection: config.collection,
                cities: Arc::new(cities),
                notices,
                subscription: Mutex::new(None),
            }),
        }
    }

    fn subscription(&self) -> MutexGuard<'_, Option<Subscription<S>>> {
        self.inner
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Open the standing subscription, replacing any existing one.
    ///
    /// A store error opening the listener is reported as a notice.
    pub async fn subscribe(&self) {
        // Release first so at most one listener exists at any time.
        self.unsubscribe();

        let (sink, events) = mpsc::unbounded_channel();
        let listener = match self.inner.store.listen(&self.inner.collection, sink).await {
            Ok(listener) => listener,
            Err(e) => {
                self.notify(Notice::SubscriptionFailed {
                    reason: e.to_string(),
                });
                return;
            }
        };

        let pump = tokio::spawn(pump_snapshots(
            events,
            Arc::clone(&self.inner.cities),
            self.inner.notices.clone(),
        ));

        tracing::info!("Subscribed to '{}' ({})", self.inner.collection, listener);
        let previous = self.subscription().replace(Subscription {
            store: Arc::clone(&self.inner.store),
            listener,
            pump,
        });
        // A concurrent subscribe may have won the race; keep only ours.
        drop(previous);
    }

    /// Release the standing subscription, if any.
    pub fn unsubscribe(&self) {
        let previous = self.subscription().take();
        if previous.is_some() {
            tracing::info!("Unsubscribed from '{}'", self.inner.collection);
        }
    }

    /// Whether a subscription is active.
    pub fn is_subscribed(&self) -> bool {
        self.subscription().is_some()
    }

    /// Release the subscription ahead of teardown.
    pub fn shutdown(&self) {
        self.unsubscribe();
    }

    /// Read-only view of the list, updated on every snapshot.
    pub fn cities(&self) -> watch::Receiver<CityView> {
        self.inner.cities.subscribe()
    }

    /// Copy of the latest list.
    pub fn current(&self) -> Vec<City> {
        self.inner.cities.borrow().as_ref().clone()
    }

    /// Stream of user-visible notices from now on.
    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.inner.notices.subscribe()
    }

    /// Collection this controller mirrors.
    pub fn collection(&self) -> &str {
        &self.inner.collection
    }

    /// Get a reference to the underlying store (for testing).
    pub fn store(&self) -> &S {
        &self.inner.store
    }

    /// Submit a new record. `None` is a no-op.
    pub async fn add_record(&self, city: Option<&City>) {
        if let Some(plan) = plan_add(city) {
            self.execute(plan).await;
        }
    }

    /// Apply new values to `city` and overwrite its document.
    ///
    /// `None` is a no-op. A record without a usable id is edited in place but
    /// not written.
    pub async fn update_record(&self, city: Option<&mut City>, name: &str, province: &str) {
        match plan_update(city, name, province) {
            Ok(Some(plan)) => self.execute(plan).await,
            Ok(None) => {}
            Err(e) => self.notify(e.into()),
        }
    }

    /// Delete the document behind `city`.
    pub async fn delete_record(&self, city: &City) {
        match plan_delete(city) {
            Ok(plan) => self.execute(plan).await,
            Err(e) => self.notify(e.into()),
        }
    }

    /// Front-end intent: add a city. Runs in the background.
    pub fn on_add_requested(&self, name: &str, province: &str) -> JoinHandle<()> {
        let controller = self.clone();
        let city = City::new(name, province);
        tokio::spawn(async move { controller.add_record(Some(&city)).await })
    }

    /// Front-end intent: edit a city. Runs in the background.
    pub fn on_update_requested(&self, city: City, name: &str, province: &str) -> JoinHandle<()> {
        let controller = self.clone();
        let (name, province) = (name.to_string(), province.to_string());
        tokio::spawn(async move {
            let mut city = city;
            controller
                .update_record(Some(&mut city), &name, &province)
                .await
        })
    }

    /// Front-end intent: delete a city. Runs in the background.
    pub fn on_delete_requested(&self, city: City) -> JoinHandle<()> {
        let controller = self.clone();
        tokio::spawn(async move { controller.delete_record(&city).await })
    }

    async fn execute(&self, plan: WritePlan) {
        let op = plan.op();
        let store = &self.inner.store;
        let collection = self.inner.collection.as_str();

        let result = match plan {
            WritePlan::Add { fields } => store
                .add(collection, fields)
                .await
                .map(|id| Notice::Added { id }),
            WritePlan::Set { id, fields } => {
                let outcome = store.set(collection, &id, fields).await;
                outcome.map(|()| Notice::Updated { id })
            }
            WritePlan::Delete { id } => {
                let outcome = store.delete(collection, &id).await;
                outcome.map(|()| Notice::Deleted { id })
            }
        };

        let notice = result.unwrap_or_else(|e| Notice::WriteFailed {
            op,
            reason: e.to_string(),
        });
        self.notify(notice);
    }

    fn notify(&self, notice: Notice) {
        publish(&self.inner.notices, notice);
    }
}

impl<S: DocumentStore + 'static> Clone for CityController<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Log a notice and hand it to whoever is listening.
fn publish(notices: &broadcast::Sender<Notice>, notice: Notice) {
    if notice.is_error() {
        tracing::warn!("{}", notice);
    } else {
        tracing::info!("{}", notice);
    }
    // No receivers just means nobody is looking.
    let _ = notices.send(notice);
}

/// Apply snapshot events to the list in delivery order.
async fn pump_snapshots(
    mut events: mpsc::UnboundedReceiver<SnapshotEvent>,
    cities: Arc<watch::Sender<CityView>>,
    notices: broadcast::Sender<Notice>,
) {
    let mut list = CityList::new();

    while let Some(event) = events.recv().await {
        let event = match event {
            Ok(docs) => ListEvent::Snapshot(docs),
            Err(e) => ListEvent::SnapshotFailed {
                reason: e.to_string(),
            },
        };

        let (next, actions) = list.on_event(event);
        list = next;

        for action in actions {
            match action {
                Action::Render => {
                    tracing::debug!("Rendering {} cities", list.len());
                    cities.send_replace(Arc::new(list.cities().to_vec()));
                }
                Action::Notify(notice) => publish(&notices, notice),
            }
        }
    }

    tracing::debug!("Snapshot stream closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FileStore, MemoryStore, StoreError};
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(2);

    fn controller() -> (CityController<MemoryStore>, MemoryStore) {
        let store = MemoryStore::new();
        let controller = CityController::new(store.clone(), ControllerConfig::default());
        (controller, store)
    }

    /// Wait for the next published list.
    async fn next_list(rx: &mut watch::Receiver<CityView>) -> Vec<City> {
        tokio::time::timeout(WAIT, rx.changed())
            .await
            .expect("timed out waiting for list")
            .expect("list channel closed");
        rx.borrow_and_update().as_ref().clone()
    }

    /// Wait for the next notice.
    async fn next_notice(rx: &mut broadcast::Receiver<Notice>) -> Notice {
        tokio::time::timeout(WAIT, rx.recv())
            .await
            .expect("timed out waiting for notice")
            .expect("notice channel closed")
    }

    async fn seed(store: &MemoryStore, id: &str, name: &str, province: &str) {
        store.queue_next_id(id);
        store
            .add(DEFAULT_COLLECTION, City::new(name, province).to_persistable())
            .await
            .unwrap();
    }

    // ===========================================
    // Configuration Tests
    // ===========================================

    #[test]
    fn config_defaults_to_cities() {
        let config = ControllerConfig::default();
        assert_eq!(config.collection, "cities");
        assert_eq!(config.notice_capacity, DEFAULT_NOTICE_CAPACITY);
    }

    #[test]
    fn config_builder_pattern() {
        let config = ControllerConfig::new("towns").with_notice_capacity(0);
        assert_eq!(config.collection, "towns");
        assert_eq!(config.notice_capacity, 1);
    }

    // ===========================================
    // Subscription Tests
    // ===========================================

    #[tokio::test]
    async fn subscribe_loads_existing_documents() {
        let (controller, store) = controller();
        seed(&store, "e", "Edmonton", "Alberta").await;
        let mut rx = controller.cities();

        controller.subscribe().await;

        let list = next_list(&mut rx).await;
        assert_eq!(list, vec![City::with_id("e", "Edmonton", "Alberta")]);
        assert!(controller.is_subscribed());
    }

    #[tokio::test]
    async fn subscribe_twice_keeps_one_listener() {
        let (controller, store) = controller();

        controller.subscribe().await;
        controller.subscribe().await;

        assert_eq!(store.active_listeners(), 1);
        assert!(controller.is_subscribed());
    }

    #[tokio::test]
    async fn unsubscribe_releases_listener() {
        let (controller, store) = controller();
        controller.subscribe().await;
        assert_eq!(store.active_listeners(), 1);

        controller.unsubscribe();

        assert_eq!(store.active_listeners(), 0);
        assert!(!controller.is_subscribed());
    }

    #[tokio::test]
    async fn unsubscribe_without_subscription_is_noop() {
        let (controller, store) = controller();
        controller.unsubscribe();
        controller.shutdown();
        assert_eq!(store.active_listeners(), 0);
    }

    #[tokio::test]
    async fn dropping_last_clone_releases_listener() {
        let (controller, store) = controller();
        let other = controller.clone();
        controller.subscribe().await;

        drop(controller);
        assert_eq!(store.active_listeners(), 1);

        drop(other);
        assert_eq!(store.active_listeners(), 0);
    }

    #[tokio::test]
    async fn listen_failure_is_reported() {
        let (controller, store) = controller();
        let mut notices = controller.notices();
        store.fail_next_listen(StoreError::PermissionDenied("cities".into()));

        controller.subscribe().await;

        assert_eq!(
            next_notice(&mut notices).await,
            Notice::SubscriptionFailed {
                reason: "permission denied: cities".into()
            }
        );
        assert!(!controller.is_subscribed());
    }

    // ===========================================
    // Snapshot Tests
    // ===========================================

    #[tokio::test]
    async fn snapshot_replaces_prior_list() {
        let (controller, store) = controller();
        seed(&store, "old", "Old", "Town").await;
        let mut rx = controller.cities();
        controller.subscribe().await;
        assert_eq!(next_list(&mut rx).await.len(), 1);

        store
            .set(DEFAULT_COLLECTION, "old", City::new("X", "Y").to_persistable())
            .await
            .unwrap();
        store.delete(DEFAULT_COLLECTION, "old").await.unwrap();
        seed(&store, "a", "X", "Y").await;

        // Intermediate snapshots may coalesce; wait for the final one.
        let mut list = next_list(&mut rx).await;
        while list.len() != 1 || list[0].id() != Some("a") {
            list = next_list(&mut rx).await;
        }
        assert_eq!(list, vec![City::with_id("a", "X", "Y")]);
    }

    #[tokio::test]
    async fn snapshot_error_keeps_list() {
        let (controller, store) = controller();
        seed(&store, "a", "X", "Y").await;
        let mut rx = controller.cities();
        let mut notices = controller.notices();
        controller.subscribe().await;
        let before = next_list(&mut rx).await;

        store.push_error(DEFAULT_COLLECTION, StoreError::Unavailable("offline".into()));

        assert_eq!(
            next_notice(&mut notices).await,
            Notice::SubscriptionFailed {
                reason: "unavailable: offline".into()
            }
        );
        assert_eq!(controller.current(), before);
        assert!(!rx.has_changed().unwrap());
    }

    // ===========================================
    // Add Tests
    // ===========================================

    #[tokio::test]
    async fn add_round_trips_through_snapshot() {
        let (controller, store) = controller();
        let mut rx = controller.cities();
        let mut notices = controller.notices();
        controller.subscribe().await;
        assert!(next_list(&mut rx).await.is_empty());

        store.queue_next_id("r1");
        controller
            .add_record(Some(&City::new("Regina", "Saskatchewan")))
            .await;

        assert_eq!(
            next_notice(&mut notices).await,
            Notice::Added { id: "r1".into() }
        );
        assert_eq!(
            next_list(&mut rx).await,
            vec![City::with_id("r1", "Regina", "Saskatchewan")]
        );
    }

    #[tokio::test]
    async fn add_none_makes_no_store_call() {
        let (controller, store) = controller();
        controller.add_record(None).await;
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn add_failure_is_reported_and_list_untouched() {
        let (controller, store) = controller();
        let mut notices = controller.notices();
        store.fail_next_add(StoreError::PermissionDenied("read-only".into()));

        controller.add_record(Some(&City::new("A", "B"))).await;

        assert_eq!(
            next_notice(&mut notices).await,
            Notice::WriteFailed {
                op: city_core::Op::Add,
                reason: "permission denied: read-only".into()
            }
        );
        assert!(controller.current().is_empty());
        assert!(store.documents(DEFAULT_COLLECTION).is_empty());
    }

    #[tokio::test]
    async fn failed_file_save_leaves_list_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cities.json");
        let store = FileStore::open(&path).await.unwrap();
        tokio::fs::create_dir(&path).await.unwrap();

        let controller = CityController::new(store, ControllerConfig::default());
        let mut rx = controller.cities();
        let mut notices = controller.notices();
        controller.subscribe().await;
        assert!(next_list(&mut rx).await.is_empty());

        controller
            .add_record(Some(&City::new("Regina", "Saskatchewan")))
            .await;

        let notice = next_notice(&mut notices).await;
        assert!(matches!(
            notice,
            Notice::WriteFailed {
                op: city_core::Op::Add,
                ..
            }
        ));
        assert!(controller.store().memory().documents(DEFAULT_COLLECTION).is_empty());
        assert!(controller.current().is_empty());
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn add_does_not_touch_list_without_subscription() {
        let (controller, store) = controller();
        controller.add_record(Some(&City::new("A", "B"))).await;

        assert_eq!(store.documents(DEFAULT_COLLECTION).len(), 1);
        assert!(controller.current().is_empty());
    }

    // ===========================================
    // Update Tests
    // ===========================================

    #[tokio::test]
    async fn update_overwrites_document() {
        let (controller, store) = controller();
        seed(&store, "c1", "Calgary", "AB").await;
        let mut notices = controller.notices();
        let mut city = City::with_id("c1", "Calgary", "AB");

        controller
            .update_record(Some(&mut city), "Calgary", "Alberta")
            .await;

        assert_eq!(city.province(), "Alberta");
        assert_eq!(
            next_notice(&mut notices).await,
            Notice::Updated { id: "c1".into() }
        );
        let docs = store.documents(DEFAULT_COLLECTION);
        assert_eq!(City::from_document(&docs[0]), city);
    }

    #[tokio::test]
    async fn update_without_id_makes_no_store_call() {
        let (controller, store) = controller();
        let mut notices = controller.notices();

        let mut unsaved = City::new("A", "B");
        controller.update_record(Some(&mut unsaved), "C", "D").await;
        let mut blank = City::with_id("", "A", "B");
        controller.update_record(Some(&mut blank), "C", "D").await;

        assert_eq!(store.call_count(), 0);
        assert_eq!(unsaved.name(), "C");
        for _ in 0..2 {
            assert_eq!(
                next_notice(&mut notices).await,
                Notice::MissingId {
                    op: city_core::Op::Update
                }
            );
        }
    }

    #[tokio::test]
    async fn update_none_is_noop() {
        let (controller, store) = controller();
        let mut notices = controller.notices();

        controller.update_record(None, "A", "B").await;

        assert_eq!(store.call_count(), 0);
        assert!(notices.try_recv().is_err());
    }

    #[tokio::test]
    async fn update_failure_is_reported() {
        let (controller, store) = controller();
        let mut notices = controller.notices();
        store.fail_next_set(StoreError::NotFound("c9".into()));

        let mut city = City::with_id("c9", "A", "B");
        controller.update_record(Some(&mut city), "C", "D").await;

        let notice = next_notice(&mut notices).await;
        assert_eq!(notice.to_string(), "Update failed: not found: c9");
    }

    // ===========================================
    // Delete Tests
    // ===========================================

    #[tokio::test]
    async fn delete_removes_document_via_snapshot() {
        let (controller, store) = controller();
        seed(&store, "d1", "Moncton", "New Brunswick").await;
        let mut rx = controller.cities();
        controller.subscribe().await;
        let list = next_list(&mut rx).await;

        controller.delete_record(&list[0]).await;

        assert!(next_list(&mut rx).await.is_empty());
    }

    #[tokio::test]
    async fn delete_without_id_makes_no_store_call() {
        let (controller, store) = controller();
        let mut notices = controller.notices();

        controller.delete_record(&City::with_id("", "A", "B")).await;
        controller.delete_record(&City::new("A", "B")).await;

        assert_eq!(store.call_count(), 0);
        for _ in 0..2 {
            let notice = next_notice(&mut notices).await;
            assert_eq!(
                notice,
                Notice::MissingId {
                    op: city_core::Op::Delete
                }
            );
            assert_eq!(notice.to_string(), "Cannot delete: missing document id");
        }
    }

    #[tokio::test]
    async fn delete_failure_is_reported() {
        let (controller, store) = controller();
        let mut notices = controller.notices();
        store.fail_next_delete(StoreError::Unavailable("offline".into()));

        controller
            .delete_record(&City::with_id("d1", "A", "B"))
            .await;

        assert_eq!(
            next_notice(&mut notices).await.to_string(),
            "Delete failed: unavailable: offline"
        );
    }

    // ===========================================
    // Intent Handler Tests
    // ===========================================

    #[tokio::test]
    async fn intent_handlers_run_in_background() {
        let (controller, store) = controller();
        let mut rx = controller.cities();
        controller.subscribe().await;
        next_list(&mut rx).await;

        store.queue_next_id("h1");
        controller
            .on_add_requested("Halifax", "NS")
            .await
            .unwrap();
        let list = next_list(&mut rx).await;
        assert_eq!(list, vec![City::with_id("h1", "Halifax", "NS")]);

        controller
            .on_update_requested(list[0].clone(), "Halifax", "Nova Scotia")
            .await
            .unwrap();
        let list = next_list(&mut rx).await;
        assert_eq!(list[0].province(), "Nova Scotia");

        controller
            .on_delete_requested(list[0].clone())
            .await
            .unwrap();
        assert!(next_list(&mut rx).await.is_empty());
    }

    #[tokio::test]
    async fn store_accessible_for_testing() {
        let (controller, _store) = controller();
        assert_eq!(controller.store().active_listeners(), 0);
        assert_eq!(controller.collection(), "cities");
    }
}
