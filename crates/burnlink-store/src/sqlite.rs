//! SQLite implementation of the Store trait.
//!
//! This is the primary storage backend for Burnlink. It uses rusqlite with
//! bundled SQLite, wrapped in async via tokio::spawn_blocking.
//!
//! Every operation is a single SQL statement. `consume` in particular is one
//! `UPDATE … RETURNING`, which SQLite executes under its database write lock,
//! so it stays atomic across connections and processes sharing a file.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};

use burnlink_core::{ExternalId, Message, MessageKind};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{InsertResult, Store};

/// How long a statement waits for another connection's write lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const MESSAGE_COLUMNS: &str =
    "external_id, ciphertext, kind, created_at, expires_at, view_limit, view_count, is_active";

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist. The database
    /// is switched to WAL mode so readers in other processes are not blocked.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        tracing::debug!(journal_mode = %mode, "opened sqlite store");
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking operation on the connection in the blocking pool.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

// Helper to convert a row to Message
fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    let external_id: String = row.get("external_id")?;
    let kind: String = row.get("kind")?;

    Ok(Message {
        external_id: ExternalId::parse(&external_id).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?,
        ciphertext: row.get("ciphertext")?,
        kind: kind.parse::<MessageKind>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?,
        created_at: row.get("created_at")?,
        expires_at: row.get("expires_at")?,
        view_limit: row.get("view_limit")?,
        view_count: row.get("view_count")?,
        is_active: row.get("is_active")?,
    })
}

fn is_primary_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

#[async_trait]
impl Store for SqliteStore {
    async fn insert(&self, message: &Message) -> Result<InsertResult> {
        let message = message.clone();

        self.run(move |conn| {
            let inserted = conn.execute(
                "INSERT INTO messages (
                    external_id, ciphertext, kind, created_at, expires_at,
                    view_limit, view_count, is_active
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    message.external_id.as_str(),
                    message.ciphertext,
                    message.kind.as_str(),
                    message.created_at,
                    message.expires_at,
                    message.view_limit,
                    message.view_count,
                    message.is_active,
                ],
            );

            match inserted {
                Ok(_) => Ok(InsertResult::Inserted),
                Err(e) if is_primary_key_violation(&e) => Ok(InsertResult::Conflict),
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    async fn consume(&self, id: &ExternalId, now: i64) -> Result<Option<Message>> {
        let id = id.clone();

        self.run(move |conn| {
            let sql = format!(
                "UPDATE messages
                 SET view_count = view_count + 1,
                     is_active = CASE WHEN view_count + 1 < view_limit THEN 1 ELSE 0 END
                 WHERE external_id = ?1
                   AND is_active = 1
                   AND expires_at > ?2
                   AND view_count < view_limit
                 RETURNING {}",
                MESSAGE_COLUMNS
            );

            let message = conn
                .query_row(&sql, params![id.as_str(), now], row_to_message)
                .optional()?;

            Ok(message)
        })
        .await
    }

    async fn find_active(&self, id: &ExternalId, now: i64) -> Result<Option<Message>> {
        let id = id.clone();

        self.run(move |conn| {
            let sql = format!(
                "SELECT {} FROM messages
                 WHERE external_id = ?1 AND is_active = 1 AND expires_at > ?2",
                MESSAGE_COLUMNS
            );

            let message = conn
                .query_row(&sql, params![id.as_str(), now], row_to_message)
                .optional()?;

            Ok(message)
        })
        .await
    }

    async fn count(&self) -> Result<u64> {
        self.run(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))?;
            u64::try_from(count)
                .map_err(|_| StoreError::InvalidData(format!("negative count {}", count)))
        })
        .await
    }

    async fn delete_if_inactive(&self, id: &ExternalId, now: i64) -> Result<bool> {
        let id = id.clone();

        self.run(move |conn| {
            let removed = conn.execute(
                "DELETE FROM messages
                 WHERE external_id = ?1 AND (is_active = 0 OR expires_at <= ?2)",
                params![id.as_str(), now],
            )?;
            Ok(removed > 0)
        })
        .await
    }

    async fn sweep_expired(&self, now: i64) -> Result<u64> {
        self.run(move |conn| {
            let removed = conn.execute(
                "DELETE FROM messages WHERE is_active = 0 OR expires_at <= ?1",
                params![now],
            )?;
            Ok(removed as u64)
        })
        .await
    }
}
