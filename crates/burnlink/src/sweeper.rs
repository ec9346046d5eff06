//! Periodic cleanup of expired and spent messages.

use std::sync::Arc;
use std::time::Duration;

use burnlink_store::Store;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

use crate::service::MessageService;

/// A background task that calls [`MessageService::cleanup`] on a fixed period.
pub struct Sweeper {
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl Sweeper {
    /// Start sweeping. The first sweep runs immediately.
    pub fn spawn<S: Store + 'static>(service: Arc<MessageService<S>>, period: Duration) -> Self {
        let (stop, mut stopped) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = &mut stopped => break,
                    _ = ticker.tick() => {
                        if let Err(e) = service.cleanup().await {
                            warn!(error = %e, "periodic sweep failed");
                        }
                    }
                }
            }
            debug!("sweeper stopped");
        });

        debug!(period_secs = period.as_secs(), "sweeper started");
        Self { stop, task }
    }

    /// Stop the sweeper and wait for an in-flight sweep to finish.
    pub async fn stop(self) {
        let _ = self.stop.send(());
        if let Err(e) = self.task.await {
            warn!(error = %e, "sweeper task ended abnormally");
        }
    }
}
