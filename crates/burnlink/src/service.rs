//! The message lifecycle service.
//!
//! Owns the business transitions of a message: validation and sealing on
//! create, the consuming read, and cleanup of dead records. Cross-request
//! coordination lives entirely in [`Store::consume`]; the service holds no
//! locks of its own.

use std::fmt;
use std::sync::Arc;

use burnlink_core::{
    Clock, ExpiryHours, ExternalId, IdGenerator, Message, MessageCodec, MessageKind,
    RandomIdGenerator, SystemClock, ValidationError, ViewLimit, DEFAULT_EXPIRY_HOURS,
    DEFAULT_VIEW_LIMIT,
};
use burnlink_store::{InsertResult, Store};
use tracing::{debug, error, info, warn};

use crate::error::{BurnlinkError, Result};
use crate::reaper::DeletionQueue;

/// Parameters for creating a message.
#[derive(Clone, PartialEq, Eq)]
pub struct CreateOptions {
    pub content: String,
    pub expiry_hours: u32,
    pub view_limit: u32,
    pub kind: MessageKind,
}

impl CreateOptions {
    /// Options with default policy: one view, 24 hours, simple text.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            expiry_hours: DEFAULT_EXPIRY_HOURS,
            view_limit: DEFAULT_VIEW_LIMIT,
            kind: MessageKind::default(),
        }
    }

    pub fn expiry_hours(mut self, hours: u32) -> Self {
        self.expiry_hours = hours;
        self
    }

    pub fn view_limit(mut self, limit: u32) -> Self {
        self.view_limit = limit;
        self
    }

    pub fn kind(mut self, kind: MessageKind) -> Self {
        self.kind = kind;
        self
    }
}

impl fmt::Debug for CreateOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateOptions")
            .field("content", &format_args!("<{} bytes>", self.content.len()))
            .field("expiry_hours", &self.expiry_hours)
            .field("view_limit", &self.view_limit)
            .field("kind", &self.kind)
            .finish()
    }
}

/// The result of a successful read.
#[derive(Clone, PartialEq, Eq)]
pub struct ReadOutcome {
    /// Decrypted content.
    pub content: String,
    /// Views left after this one.
    pub remaining_views: u32,
    /// True if this read spent the last view.
    pub is_last_view: bool,
    pub kind: MessageKind,
}

impl fmt::Debug for ReadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOutcome")
            .field("content", &"<redacted>")
            .field("remaining_views", &self.remaining_views)
            .field("is_last_view", &self.is_last_view)
            .field("kind", &self.kind)
            .finish()
    }
}

/// The lifecycle service.
pub struct MessageService<S: Store> {
    store: Arc<S>,
    codec: MessageCodec,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    deletions: DeletionQueue,
}

impl<S: Store + 'static> MessageService<S> {
    /// Create a service with random ids and the system clock.
    ///
    /// Spawns the deletion worker, so it must run inside a tokio runtime.
    pub fn new(store: Arc<S>, codec: MessageCodec) -> Self {
        Self::with_parts(
            store,
            codec,
            Arc::new(RandomIdGenerator::new()),
            Arc::new(SystemClock),
        )
    }

    /// Create a service with explicit id and time sources.
    pub fn with_parts(
        store: Arc<S>,
        codec: MessageCodec,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let deletions = DeletionQueue::spawn(store.clone(), clock.clone());
        Self {
            store,
            codec,
            ids,
            clock,
            deletions,
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Validate, seal and store a new message. Returns its external id.
    ///
    /// All validation happens before the store is touched.
    pub async fn create(&self, options: CreateOptions) -> Result<ExternalId> {
        if options.content.trim().is_empty() {
            return Err(ValidationError::EmptyContent.into());
        }
        let view_limit = ViewLimit::new(options.view_limit)?;
        let expiry = ExpiryHours::new(options.expiry_hours)?;
        options.kind.validate_content(&options.content)?;

        let id = self.ids.next_id();
        let ciphertext = self.codec.encode(&options.content).map_err(|e| {
            error!(error = %e, "failed to seal message content");
            BurnlinkError::Encryption
        })?;

        let now = self.clock.now_millis();
        let message = Message::new(id.clone(), ciphertext, options.kind, view_limit, expiry, now);

        match self.store.insert(&message).await {
            Ok(InsertResult::Inserted) => {
                info!(
                    external_id = id.short(),
                    view_limit = view_limit.get(),
                    expiry_hours = expiry.get(),
                    kind = %options.kind,
                    "message created"
                );
                Ok(id)
            }
            Ok(InsertResult::Conflict) => {
                warn!(external_id = id.short(), "external id collision");
                Err(BurnlinkError::Conflict(id))
            }
            Err(e) => {
                error!(error = %e, "failed to store message");
                Err(BurnlinkError::Database)
            }
        }
    }

    /// Consume one view of a message and return its content.
    ///
    /// Unknown, expired and already spent messages are indistinguishable. A
    /// view is spent once the store accepts it, even if the content then
    /// fails to decode.
    pub async fn read(&self, id: &str) -> Result<ReadOutcome> {
        let id = ExternalId::parse(id)?;
        let now = self.clock.now_millis();

        let message = self
            .store
            .consume(&id, now)
            .await
            .map_err(|e| {
                error!(external_id = id.short(), error = %e, "failed to consume message");
                BurnlinkError::Database
            })?
            .ok_or_else(|| {
                debug!(external_id = id.short(), "message not available");
                BurnlinkError::MessageNotFound
            })?;

        let state = message.state(now);
        if state.is_terminal() {
            self.deletions.schedule(id.clone());
        }
        let is_last_view = message.is_last_view();

        let content = self.codec.decode(&message.ciphertext).map_err(|e| {
            error!(external_id = id.short(), error = %e, "stored content failed to decode");
            BurnlinkError::Encryption
        })?;

        info!(
            external_id = id.short(),
            remaining_views = message.remaining_views(),
            is_last_view,
            "message read"
        );

        Ok(ReadOutcome {
            content,
            remaining_views: message.remaining_views(),
            is_last_view,
            kind: message.kind,
        })
    }

    /// Whether a message can currently be read. Does not spend a view.
    pub async fn is_available(&self, id: &str) -> Result<bool> {
        let id = ExternalId::parse(id)?;
        let found = self
            .store
            .find_active(&id, self.clock.now_millis())
            .await
            .map_err(|e| {
                error!(external_id = id.short(), error = %e, "failed to look up message");
                BurnlinkError::Database
            })?;
        Ok(found.is_some())
    }

    /// Remove every expired or spent message. Returns how many were removed.
    pub async fn cleanup(&self) -> Result<u64> {
        let removed = self
            .store
            .sweep_expired(self.clock.now_millis())
            .await
            .map_err(|e| {
                error!(error = %e, "cleanup sweep failed");
                BurnlinkError::Database
            })?;

        if removed > 0 {
            info!(removed, "swept dead messages");
        }
        Ok(removed)
    }

    /// Stop the deletion queue and wait for pending deletions.
    pub async fn shutdown(&self) {
        self.deletions.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burnlink_core::{MessageState, SecretKey};
    use burnlink_store::MemoryStore;

    fn service() -> MessageService<MemoryStore> {
        MessageService::new(
            Arc::new(MemoryStore::new()),
            MessageCodec::new(&SecretKey::generate()),
        )
    }

    #[tokio::test]
    async fn test_create_and_read() {
        let service = service();
        let id = service
            .create(CreateOptions::new("the eagle lands at noon"))
            .await
            .unwrap();

        let outcome = service.read(id.as_str()).await.unwrap();
        assert_eq!(outcome.content, "the eagle lands at noon");
        assert_eq!(outcome.remaining_views, 0);
        assert!(outcome.is_last_view);

        let err = service.read(id.as_str()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_content_is_sealed_at_rest() {
        let service = service();
        let id = service.create(CreateOptions::new("plain secret")).await.unwrap();

        let stored = service
            .store()
            .find_active(&id, SystemClock.now_millis())
            .await
            .unwrap()
            .unwrap();
        assert!(!stored.ciphertext.contains("plain secret"));
    }

    #[tokio::test]
    async fn test_validation_precedes_store() {
        let service = service();

        let err = service.create(CreateOptions::new("  \n")).await.unwrap_err();
        assert!(matches!(err, BurnlinkError::InvalidInput(_)));

        let err = service
            .create(CreateOptions::new("x").view_limit(0))
            .await
            .unwrap_err();
        assert!(matches!(err, BurnlinkError::InvalidViewLimit(0)));

        let err = service
            .create(CreateOptions::new("x").expiry_hours(169))
            .await
            .unwrap_err();
        assert!(matches!(err, BurnlinkError::InvalidInput(_)));

        assert_eq!(service.store().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_read_rejects_malformed_id() {
        let service = service();
        assert!(matches!(
            service.read("").await.unwrap_err(),
            BurnlinkError::InvalidInput(_)
        ));
        assert!(matches!(
            service.read("../etc/passwd").await.unwrap_err(),
            BurnlinkError::InvalidInput(_)
        ));
    }

    #[tokio::test]
    async fn test_is_available_does_not_spend() {
        let service = service();
        let id = service.create(CreateOptions::new("peek")).await.unwrap();

        assert!(service.is_available(id.as_str()).await.unwrap());
        assert!(service.is_available(id.as_str()).await.unwrap());
        service.read(id.as_str()).await.unwrap();
        assert!(!service.is_available(id.as_str()).await.unwrap());
    }

    #[tokio::test]
    async fn test_only_terminal_reads_delete() {
        let service = service();
        let once = service.create(CreateOptions::new("once")).await.unwrap();
        let twice = service
            .create(CreateOptions::new("twice").view_limit(2))
            .await
            .unwrap();

        service.read(once.as_str()).await.unwrap();
        service.read(twice.as_str()).await.unwrap();
        service.shutdown().await;

        // The exhausted record is gone; the one with a view left remains.
        assert_eq!(service.store().count().await.unwrap(), 1);
        let left = service
            .store()
            .find_active(&twice, SystemClock.now_millis())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(left.state(SystemClock.now_millis()), MessageState::Active);
    }

    #[test]
    fn test_debug_hides_content() {
        let options = CreateOptions::new("hunter2");
        assert!(!format!("{:?}", options).contains("hunter2"));

        let outcome = ReadOutcome {
            content: "hunter2".into(),
            remaining_views: 0,
            is_last_view: true,
            kind: MessageKind::Simple,
        };
        assert!(!format!("{:?}", outcome).contains("hunter2"));
    }
}
