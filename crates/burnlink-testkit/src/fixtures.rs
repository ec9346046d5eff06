//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: a controllable clock, scripted
//! ids, and a service wired to a store that tests can inspect directly.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use burnlink::{MessageService, Result};
use burnlink_core::{Clock, ExternalId, IdGenerator, MessageCodec, RandomIdGenerator, SecretKey};
use burnlink_store::{MemoryStore, SqliteStore, Store};

/// Secret used by fixtures unless a test picks its own.
pub const TEST_SECRET: &str = "burnlink test secret";

/// Fixed starting instant for manual clocks (Unix ms).
pub const START_MILLIS: i64 = 1_700_000_000_000;

const MILLIS_PER_HOUR: i64 = 3_600_000;

/// Codec keyed by [`TEST_SECRET`].
pub fn test_codec() -> MessageCodec {
    codec_for(TEST_SECRET)
}

/// Codec keyed by an arbitrary secret.
pub fn codec_for(secret: &str) -> MessageCodec {
    let key = SecretKey::from_secret(secret).expect("fixture secret must not be blank");
    MessageCodec::new(&key)
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start: i64) -> Self {
        Self {
            now: AtomicI64::new(start),
        }
    }

    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }

    pub fn advance_hours(&self, hours: i64) {
        self.advance(hours * MILLIS_PER_HOUR);
    }

    pub fn set(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(START_MILLIS)
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Hands out preset ids in order, then falls back to random ones.
pub struct ScriptedIds {
    queue: Mutex<VecDeque<ExternalId>>,
    fallback: RandomIdGenerator,
}

impl ScriptedIds {
    /// Panics if any id is malformed; this is test setup.
    pub fn new<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        let queue = ids
            .into_iter()
            .map(|s| ExternalId::parse(s).unwrap_or_else(|e| panic!("bad scripted id {s:?}: {e}")))
            .collect();
        Self {
            queue: Mutex::new(queue),
            fallback: RandomIdGenerator::new(),
        }
    }
}

impl IdGenerator for ScriptedIds {
    fn next_id(&self) -> ExternalId {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| self.fallback.next_id())
    }
}

/// A service over an inspectable store and a manual clock.
///
/// Building a fixture spawns the service's deletion worker, so it must
/// happen inside a tokio runtime.
pub struct TestFixture<S: Store + 'static = MemoryStore> {
    pub store: Arc<S>,
    pub clock: Arc<ManualClock>,
    pub service: MessageService<S>,
}

impl TestFixture<MemoryStore> {
    /// Fixture over a fresh in-memory store.
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }
}

impl Default for TestFixture<MemoryStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixture<SqliteStore> {
    /// Fixture over a private in-memory SQLite database.
    pub fn sqlite() -> std::result::Result<Self, burnlink_store::StoreError> {
        Ok(Self::with_store(SqliteStore::open_memory()?))
    }
}

impl<S: Store + 'static> TestFixture<S> {
    /// Fixture over the given store.
    pub fn with_store(store: S) -> Self {
        Self::with_shared_store(Arc::new(store))
    }

    /// Fixture over a store that other fixtures may also use.
    pub fn with_shared_store(store: Arc<S>) -> Self {
        let clock = Arc::new(ManualClock::default());
        let service = MessageService::with_parts(
            store.clone(),
            test_codec(),
            Arc::new(RandomIdGenerator::new()),
            clock.clone(),
        );
        Self {
            store,
            clock,
            service,
        }
    }

    /// Replace the id source. The previous service is dropped.
    pub fn with_ids(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.service = MessageService::with_parts(
            self.store.clone(),
            test_codec(),
            Arc::new(ids),
            self.clock.clone(),
        );
        self
    }

    /// A second service on the same store and clock with a different codec.
    pub fn service_with_codec(&self, codec: MessageCodec) -> MessageService<S> {
        MessageService::with_parts(
            self.store.clone(),
            codec,
            Arc::new(RandomIdGenerator::new()),
            self.clock.clone(),
        )
    }

    pub fn advance_hours(&self, hours: i64) {
        self.clock.advance_hours(hours);
    }

    /// Current time on the fixture clock.
    pub fn now(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Number of rows physically in the store.
    pub async fn stored(&self) -> Result<u64> {
        self.store
            .count()
            .await
            .map_err(|_| burnlink::BurnlinkError::Database)
    }
}
