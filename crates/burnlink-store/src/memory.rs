//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use burnlink_core::{ExternalId, Message};

use crate::error::{Result, StoreError};
use crate::traits::{InsertResult, Store};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock; every
/// `consume` holds the write lock for its whole read-modify-write.
pub struct MemoryStore {
    messages: RwLock<HashMap<ExternalId, Message>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            messages: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<ExternalId, Message>>> {
        self.messages
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<ExternalId, Message>>> {
        self.messages
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert(&self, message: &Message) -> Result<InsertResult> {
        let mut messages = self.write()?;

        if messages.contains_key(&message.external_id) {
            return Ok(InsertResult::Conflict);
        }

        messages.insert(message.external_id.clone(), message.clone());
        Ok(InsertResult::Inserted)
    }

    async fn consume(&self, id: &ExternalId, now: i64) -> Result<Option<Message>> {
        let mut messages = self.write()?;

        match messages.get_mut(id) {
            Some(message) if message.is_visible(now) => {
                message.record_view();
                Ok(Some(message.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn find_active(&self, id: &ExternalId, now: i64) -> Result<Option<Message>> {
        let messages = self.read()?;
        Ok(messages.get(id).filter(|m| m.is_visible(now)).cloned())
    }

    async fn count(&self) -> Result<u64> {
        let messages = self.read()?;
        Ok(messages.len() as u64)
    }

    async fn delete_if_inactive(&self, id: &ExternalId, now: i64) -> Result<bool> {
        let mut messages = self.write()?;

        let dead = messages.get(id).is_some_and(|m| !m.is_visible(now));
        if dead {
            messages.remove(id);
        }
        Ok(dead)
    }

    async fn sweep_expired(&self, now: i64) -> Result<u64> {
        let mut messages = self.write()?;

        let before = messages.len();
        messages.retain(|_, m| m.is_visible(now));
        Ok((before - messages.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burnlink_core::{ExpiryHours, MessageKind, ViewLimit};
    use proptest::prelude::*;
    use std::sync::Arc;

    const NOW: i64 = 1_700_000_000_000;

    fn make_message(id: &str, limit: u32) -> Message {
        Message::new(
            ExternalId::parse(id).unwrap(),
            "sealed".into(),
            MessageKind::Simple,
            ViewLimit::new(limit).unwrap(),
            ExpiryHours::new(1).unwrap(),
            NOW,
        )
    }

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryStore::new();
        let message = make_message("abc", 1);

        assert_eq!(store.insert(&message).await.unwrap(), InsertResult::Inserted);
        assert_eq!(store.insert(&message).await.unwrap(), InsertResult::Conflict);

        let retrieved = store.find_active(&message.external_id, NOW).await.unwrap().unwrap();
        assert_eq!(retrieved.view_count, 0);
    }

    #[tokio::test]
    async fn test_memory_store_consume_and_delete() {
        let store = MemoryStore::new();
        let message = make_message("abc", 1);
        store.insert(&message).await.unwrap();

        let consumed = store.consume(&message.external_id, NOW).await.unwrap().unwrap();
        assert!(consumed.is_last_view());
        assert!(store.consume(&message.external_id, NOW).await.unwrap().is_none());

        assert!(store.delete_if_inactive(&message.external_id, NOW).await.unwrap());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_memory_store_concurrent_consume() {
        let store = Arc::new(MemoryStore::new());
        let message = make_message("race", 3);
        store.insert(&message).await.unwrap();

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let store = store.clone();
                let id = message.external_id.clone();
                tokio::spawn(async move { store.consume(&id, NOW).await.unwrap() })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_some() {
                successes += 1;
            }
        }
        assert_eq!(successes, 3);
    }

    proptest! {
        #[test]
        fn prop_views_never_exceed_limit(limit in 1u32..=10, reads in 0usize..30) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            rt.block_on(async {
                let store = MemoryStore::new();
                let message = make_message("prop", limit);
                store.insert(&message).await.unwrap();

                let mut last_count = 0;
                let mut successes = 0usize;
                for _ in 0..reads {
                    if let Some(m) = store.consume(&message.external_id, NOW).await.unwrap() {
                        assert!(m.view_count > last_count);
                        assert!(m.view_count <= m.view_limit);
                        assert_eq!(m.is_active, m.view_count < m.view_limit);
                        last_count = m.view_count;
                        successes += 1;
                    }
                }
                assert_eq!(successes, reads.min(limit as usize));
            });
        }
    }
}
