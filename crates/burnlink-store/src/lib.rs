//! # Burnlink Store
//!
//! Storage abstraction for Burnlink. Provides a trait-based interface for
//! message persistence with SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! The [`Store`] trait hides the storage technology from the lifecycle
//! service. The primary implementation is [`SqliteStore`], with
//! [`MemoryStore`] for tests and embedding.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage
//! - [`StoreHandle`] - Connect-once, shared handle to a store
//! - [`InsertResult`] - Result of inserting a message
//!
//! ## Usage
//!
//! ```rust,no_run
//! use burnlink_store::{SqliteStore, Store};
//!
//! async fn example() {
//!     // Open a SQLite database
//!     let store = SqliteStore::open("burnlink.db").unwrap();
//!
//!     // Or use an in-memory database for testing
//!     let store = SqliteStore::open_memory().unwrap();
//!
//!     // Remove everything that can no longer be read
//!     // let removed = store.sweep_expired(now).await.unwrap();
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Active predicate at lookup time**: `find_active` and `consume` only
//!   match rows with `is_active AND expires_at > now`, so a row that expired
//!   between writes is invisible without a sweep.
//! - **Atomic consume**: each successful `consume` counts exactly one view,
//!   even with many concurrent readers across processes.
//! - **Insert never overwrites**: an id collision returns `Conflict`.

pub mod error;
pub mod handle;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use handle::{Connector, SqliteConnector, StoreHandle};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{InsertResult, Store};
