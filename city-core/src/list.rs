//! City list state machine for Listy City.
//!
//! This module provides a pure, side-effect-free state machine for the
//! in-memory list that mirrors the remote collection. It takes snapshot
//! events as input and produces a new list plus a list of actions to execute.
//!
//! The actual rendering and notification are performed by city-client, not
//! by this module.

use city_types::{City, Snapshot};

use crate::notice::Notice;

/// Ordered list of cities, rebuilt from every snapshot.
///
/// There is no incremental patching: a snapshot replaces the whole list, an
/// error leaves it exactly as it was.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CityList {
    cities: Vec<City>,
}

impl CityList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process an event and return the new list plus actions to execute.
    ///
    /// This is a pure function - no side effects. The caller (city-client)
    /// is responsible for executing the returned actions.
    pub fn on_event(self, event: ListEvent) -> (Self, Vec<Action>) {
        match event {
            ListEvent::Snapshot(docs) => {
                let cities = docs.iter().map(City::from_document).collect();
                (Self { cities }, vec![Action::Render])
            }
            ListEvent::SnapshotFailed { reason } => (
                self,
                vec![Action::Notify(Notice::SubscriptionFailed { reason })],
            ),
        }
    }

    /// Cities in store order.
    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    /// Number of cities.
    pub fn len(&self) -> usize {
        self.cities.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}

/// Events delivered by the subscription.
#[derive(Debug, Clone, PartialEq)]
pub enum ListEvent {
    /// A full snapshot of the collection.
    Snapshot(Snapshot),
    /// The store reported an error instead of a snapshot.
    SnapshotFailed {
        /// Error message from the store.
        reason: String,
    },
}

/// Actions to be executed by city-client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Publish the current list to renderers.
    Render,
    /// Show a notice to the user.
    Notify(Notice),
}
