//! Background deletion of spent messages.
//!
//! A read that spends the last view hands the id to the [`DeletionQueue`] and
//! returns immediately. A single worker task drains the queue and removes
//! each record if it is still dead. Failures are logged and otherwise
//! ignored; the periodic sweep removes anything left behind.

use std::sync::{Arc, Mutex, PoisonError};

use burnlink_core::{Clock, ExternalId};
use burnlink_store::Store;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Fire-and-forget deletion queue with one worker task.
pub struct DeletionQueue {
    sender: Mutex<Option<mpsc::UnboundedSender<ExternalId>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl DeletionQueue {
    /// Start the worker. Must be called from within a tokio runtime.
    pub fn spawn<S>(store: Arc<S>, clock: Arc<dyn Clock>) -> Self
    where
        S: Store + ?Sized + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<ExternalId>();

        let worker = tokio::spawn(async move {
            while let Some(id) = rx.recv().await {
                match store.delete_if_inactive(&id, clock.now_millis()).await {
                    Ok(true) => debug!(external_id = id.short(), "deleted spent message"),
                    Ok(false) => debug!(external_id = id.short(), "spent message already gone"),
                    Err(e) => warn!(
                        external_id = id.short(),
                        error = %e,
                        "deferred delete failed; left for the sweeper"
                    ),
                }
            }
            debug!("deletion queue drained");
        });

        Self {
            sender: Mutex::new(Some(tx)),
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Queue `id` for deletion. Returns `false` if the queue is closed.
    pub fn schedule(&self, id: ExternalId) -> bool {
        let sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        match sender.as_ref() {
            Some(tx) => match tx.send(id) {
                Ok(()) => true,
                Err(mpsc::error::SendError(id)) => {
                    warn!(external_id = id.short(), "deletion worker gone; left for the sweeper");
                    false
                }
            },
            None => {
                debug!(external_id = id.short(), "deletion queue closed; left for the sweeper");
                false
            }
        }
    }

    /// Whether new deletions are still accepted.
    pub fn is_open(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Stop accepting work and wait until everything already queued is done.
    pub async fn shutdown(&self) {
        // Dropping the sender lets the worker drain what is left, then exit.
        drop(
            self.sender
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take(),
        );

        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                warn!(error = %e, "deletion worker ended abnormally");
            }
        }
    }
}
