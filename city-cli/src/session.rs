//! A subscribed controller for the lifetime of one command.

use anyhow::{Context, Result};
use city_client::{CityController, CityView, ControllerConfig, FileStore};
use city_core::Notice;
use city_types::City;
use std::path::Path;
use std::time::Duration;
use tokio::sync::{broadcast, watch};

use crate::config::Config;

/// How long to wait for the store to answer.
const STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// Controller over a [`FileStore`], subscribed and holding its first snapshot.
pub struct Session {
    controller: CityController<FileStore>,
    cities: watch::Receiver<CityView>,
    notices: broadcast::Receiver<Notice>,
}

impl Session {
    /// Open the store, subscribe, and wait for the first snapshot.
    pub async fn open(config: &Config, data_dir: &Path) -> Result<Self> {
        let path = config.store_path(data_dir);
        tracing::debug!("Opening store {}", path.display());
        let store = FileStore::open(&path)
            .await
            .with_context(|| format!("Failed to open store {}", path.display()))?;

        let controller =
            CityController::new(store, ControllerConfig::new(&config.store.collection));
        let cities = controller.cities();
        let notices = controller.notices();

        let mut session = Self {
            controller,
            cities,
            notices,
        };
        session.controller.subscribe().await;
        session
            .wait_list()
            .await
            .context("No snapshot received from the store")?;
        Ok(session)
    }

    /// The controller.
    pub fn controller(&self) -> &CityController<FileStore> {
        &self.controller
    }

    /// The latest list.
    pub fn cities(&self) -> Vec<City> {
        self.controller.current()
    }

    /// Look a city up by id in the latest list.
    pub fn find(&self, id: &str) -> Result<City> {
        self.cities()
            .into_iter()
            .find(|c| c.id() == Some(id))
            .with_context(|| format!("No city with id '{}'", id))
    }

    /// Wait for the next list the controller publishes.
    pub async fn wait_list(&mut self) -> Result<Vec<City>> {
        tokio::time::timeout(STORE_TIMEOUT, self.cities.changed())
            .await
            .context("Timed out waiting for a snapshot")?
            .context("Controller closed")?;
        Ok(self.cities.borrow_and_update().as_ref().clone())
    }

    /// Wait for the next notice.
    pub async fn wait_notice(&mut self) -> Result<Notice> {
        tokio::time::timeout(STORE_TIMEOUT, self.notices.recv())
            .await
            .context("Timed out waiting for the store")?
            .context("Notice channel closed")
    }

    /// Release the subscription.
    pub fn close(self) {
        self.controller.shutdown();
    }
}
