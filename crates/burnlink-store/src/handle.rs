//! Connect-once store handle.
//!
//! A [`StoreHandle`] owns the process-wide store connection. The first call
//! to [`StoreHandle::get`] connects; callers that arrive while that connection
//! is still being opened wait for it instead of opening their own. Later
//! calls reuse the same shared store.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::error::{Result, StoreError};
use crate::sqlite::SqliteStore;
use crate::traits::Store;

/// Opens the underlying store. Called at most once per successful handle.
pub trait Connector: Send + Sync + 'static {
    type Store: Store + 'static;

    /// Open a connection. May block; it runs on the blocking pool.
    fn connect(&self) -> Result<Self::Store>;
}

/// Opens a [`SqliteStore`] at a path, or in memory.
#[derive(Debug, Clone, Default)]
pub struct SqliteConnector {
    path: Option<PathBuf>,
}

impl SqliteConnector {
    /// Connect to a database file, creating it if needed.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Connect to a private in-memory database.
    pub fn memory() -> Self {
        Self { path: None }
    }
}

impl Connector for SqliteConnector {
    type Store = SqliteStore;

    fn connect(&self) -> Result<SqliteStore> {
        match &self.path {
            Some(path) => SqliteStore::open(path),
            None => SqliteStore::open_memory(),
        }
    }
}

/// Lazily connected, shared store.
pub struct StoreHandle<C: Connector> {
    connector: Arc<C>,
    store: OnceCell<Arc<C::Store>>,
}

impl<C: Connector> StoreHandle<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector: Arc::new(connector),
            store: OnceCell::new(),
        }
    }

    /// Get the shared store, connecting on first use.
    ///
    /// A failed connection leaves the handle unconnected; the next call
    /// tries again.
    pub async fn get(&self) -> Result<Arc<C::Store>> {
        let store = self
            .store
            .get_or_try_init(|| async {
                let connector = self.connector.clone();
                let store = tokio::task::spawn_blocking(move || connector.connect())
                    .await
                    .map_err(|e| StoreError::Task(e.to_string()))??;
                tracing::info!("store connected");
                Ok::<_, StoreError>(Arc::new(store))
            })
            .await?;

        Ok(store.clone())
    }

    /// Whether a connection has been established.
    pub fn is_connected(&self) -> bool {
        self.store.initialized()
    }

    /// Release the handle's reference to the store.
    ///
    /// The connection closes once every clone handed out by `get` is dropped.
    /// Returns `false` if the handle was never connected.
    pub fn close(&mut self) -> bool {
        let closed = self.store.take().is_some();
        if closed {
            tracing::info!("store handle closed");
        }
        closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingConnector {
        connects: Arc<AtomicUsize>,
        fail_first: bool,
    }

    impl Connector for CountingConnector {
        type Store = MemoryStore;

        fn connect(&self) -> Result<MemoryStore> {
            let attempt = self.connects.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            if self.fail_first && attempt == 0 {
                return Err(StoreError::InvalidData("refused".into()));
            }
            Ok(MemoryStore::new())
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_get_connects_once() {
        let connects = Arc::new(AtomicUsize::new(0));
        let handle = Arc::new(StoreHandle::new(CountingConnector {
            connects: connects.clone(),
            fail_first: false,
        }));

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let handle = handle.clone();
                tokio::spawn(async move { handle.get().await.unwrap() })
            })
            .collect();

        let mut stores = Vec::new();
        for task in tasks {
            stores.push(task.await.unwrap());
        }

        assert_eq!(connects.load(Ordering::SeqCst), 1);
        assert!(stores.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert!(handle.is_connected());
    }

    #[tokio::test]
    async fn test_failed_connect_is_retried() {
        let connects = Arc::new(AtomicUsize::new(0));
        let handle = StoreHandle::new(CountingConnector {
            connects: connects.clone(),
            fail_first: true,
        });

        assert!(handle.get().await.is_err());
        assert!(!handle.is_connected());

        handle.get().await.unwrap();
        assert_eq!(connects.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_close() {
        let mut handle = StoreHandle::new(SqliteConnector::memory());
        assert!(!handle.close());

        let store = handle.get().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(handle.close());
        assert!(!handle.is_connected());
    }
}
