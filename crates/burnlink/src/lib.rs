//! # Burnlink
//!
//! One-time secret messages: content is sealed at rest, readable a bounded
//! number of times before a hard deadline, and removed once spent.
//!
//! ## Overview
//!
//! - **Create**: validate policy, seal the content, store it under a fresh
//!   random id that becomes the share link.
//! - **Read**: atomically spend one view and return the content. Unknown,
//!   expired and spent messages all read as "not found".
//! - **Cleanup**: spent records are deleted in the background after their
//!   last read; a periodic sweep removes whatever is left, expired or not.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use burnlink::{Burnlink, CreateOptions, ServiceConfig};
//!
//! async fn example() -> burnlink::Result<()> {
//!     let config = ServiceConfig::from_env()?;
//!     let app = Burnlink::start(config).await?;
//!
//!     let id = app
//!         .service()
//!         .create(CreateOptions::new("meet at the usual place").view_limit(2))
//!         .await?;
//!     println!("{}", burnlink::share_link("https://burn.example", &id));
//!
//!     let outcome = app.service().read(id.as_str()).await?;
//!     assert_eq!(outcome.remaining_views, 1);
//!
//!     app.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `burnlink::core` - Message entity, codec, ids and policy values
//! - `burnlink::store` - Storage abstraction, SQLite and memory backends

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod reaper;
pub mod runtime;
pub mod service;
pub mod sweeper;

// Re-export component crates
pub use burnlink_core as core;
pub use burnlink_store as store;

// Re-export main types for convenience
pub use api::{share_link, CreateMessageRequest, ReadMessageResponse};
pub use config::{ConfigError, ServiceConfig};
pub use error::{BurnlinkError, ErrorBody, ErrorCode, Result};
pub use reaper::DeletionQueue;
pub use runtime::Burnlink;
pub use service::{CreateOptions, MessageService, ReadOutcome};
pub use sweeper::Sweeper;

// Re-export commonly used core types
pub use burnlink_core::{ExternalId, MessageCodec, MessageKind, SecretKey};
