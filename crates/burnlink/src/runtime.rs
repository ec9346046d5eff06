//! Runtime assembly: configuration to a running service.

use std::sync::Arc;

use burnlink_store::{SqliteConnector, SqliteStore, StoreHandle};
use tracing::{error, info};

use crate::config::ServiceConfig;
use crate::error::{BurnlinkError, Result};
use crate::service::MessageService;
use crate::sweeper::Sweeper;

/// A running Burnlink instance: store handle, service and sweeper.
pub struct Burnlink {
    handle: StoreHandle<SqliteConnector>,
    service: Arc<MessageService<SqliteStore>>,
    sweeper: Option<Sweeper>,
}

impl Burnlink {
    /// Connect the store and start background tasks.
    ///
    /// The codec is built first, so a missing or unusable key stops startup
    /// before anything is opened.
    pub async fn start(config: ServiceConfig) -> Result<Self> {
        let codec = config.codec()?;

        let connector = match &config.database_path {
            Some(path) => SqliteConnector::file(path),
            None => SqliteConnector::memory(),
        };
        let handle = StoreHandle::new(connector);
        let store = handle.get().await.map_err(|e| {
            error!(error = %e, "failed to open message store");
            BurnlinkError::Database
        })?;

        let service = Arc::new(MessageService::new(store, codec));
        let sweeper = config
            .sweep_interval
            .map(|period| Sweeper::spawn(service.clone(), period));

        info!(
            persistent = config.database_path.is_some(),
            sweeper = sweeper.is_some(),
            "burnlink started"
        );

        Ok(Self {
            handle,
            service,
            sweeper,
        })
    }

    /// The lifecycle service.
    pub fn service(&self) -> &Arc<MessageService<SqliteStore>> {
        &self.service
    }

    /// Stop background tasks, drain pending deletions and release the store.
    pub async fn shutdown(mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.stop().await;
        }
        self.service.shutdown().await;
        self.handle.close();
        info!("burnlink stopped");
    }
}
