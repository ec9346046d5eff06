//! Store trait: the abstract interface for message persistence.
//!
//! This trait keeps the lifecycle service storage-agnostic. Implementations
//! include SQLite (primary) and in-memory (for tests).

use std::sync::Arc;

use async_trait::async_trait;
use burnlink_core::{ExternalId, Message};

use crate::error::Result;

/// Result of inserting a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertResult {
    /// The message was stored.
    Inserted,
    /// A message with the same external id already exists. Nothing was written.
    Conflict,
}

/// The Store trait: async interface for message persistence.
///
/// All methods take `now` (Unix ms) explicitly so that the active predicate
/// is evaluated against the caller's clock, not the backend's.
///
/// # Design Notes
///
/// - **Visibility**: a record is visible only while `is_active && expires_at > now`.
///   Dead records may still exist physically but are never returned.
/// - **Atomicity**: `consume` is the only operation that must be atomic. It
///   is the single point of coordination between concurrent readers.
#[async_trait]
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Write Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert a new message.
    ///
    /// # Returns
    /// - `Inserted` if the id was free.
    /// - `Conflict` if a record with the same id exists (visible or not).
    async fn insert(&self, message: &Message) -> Result<InsertResult>;

    /// Atomically spend one view.
    ///
    /// Locates the visible record, increments `view_count`, recomputes
    /// `is_active`, persists, and returns the updated record. Returns `None`
    /// if no visible record matches. No other `consume` or `find_active` on
    /// the same id may interleave with these steps.
    async fn consume(&self, id: &ExternalId, now: i64) -> Result<Option<Message>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Query Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Look up a visible record without spending a view.
    async fn find_active(&self, id: &ExternalId, now: i64) -> Result<Option<Message>>;

    /// Number of physically stored records, dead ones included.
    async fn count(&self) -> Result<u64>;

    // ─────────────────────────────────────────────────────────────────────────
    // Cleanup Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Delete the record if it is dead (inactive or expired).
    ///
    /// Returns `true` if a row was removed.
    async fn delete_if_inactive(&self, id: &ExternalId, now: i64) -> Result<bool>;

    /// Delete every dead record. Returns the number removed.
    async fn sweep_expired(&self, now: i64) -> Result<u64>;
}

#[async_trait]
impl<S: Store + ?Sized> Store for Arc<S> {
    async fn insert(&self, message: &Message) -> Result<InsertResult> {
        (**self).insert(message).await
    }

    async fn consume(&self, id: &ExternalId, now: i64) -> Result<Option<Message>> {
        (**self).consume(id, now).await
    }

    async fn find_active(&self, id: &ExternalId, now: i64) -> Result<Option<Message>> {
        (**self).find_active(id, now).await
    }

    async fn count(&self) -> Result<u64> {
        (**self).count().await
    }

    async fn delete_if_inactive(&self, id: &ExternalId, now: i64) -> Result<bool> {
        (**self).delete_if_inactive(id, now).await
    }

    async fn sweep_expired(&self, now: i64) -> Result<u64> {
        (**self).sweep_expired(now).await
    }
}
