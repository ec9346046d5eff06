//! # Burnlink Core
//!
//! Pure primitives for Burnlink: the one-time message entity, the token codec
//! that seals message content at rest, and external identifiers.
//!
//! This crate contains no storage and no networking. Everything here is
//! computation over values.
//!
//! ## Key Types
//!
//! - [`Message`] - The sole persisted entity
//! - [`MessageCodec`] - Authenticated encode/decode of message content
//! - [`ExternalId`] - Public, URL-safe handle embedded in share links
//! - [`ViewLimit`] / [`ExpiryHours`] - Validated creation policy values
//!
//! ## Lifecycle
//!
//! A message is `Active` until its view budget is spent (`Exhausted`) or its
//! deadline passes (`Expired`). Both terminal states are treated as gone.

pub mod clock;
pub mod codec;
pub mod error;
pub mod id;
pub mod message;
pub mod types;

pub use clock::{Clock, SystemClock};
pub use codec::{MessageCodec, SecretKey, TOKEN_VERSION};
pub use error::{CodecError, ValidationError};
pub use id::{IdGenerator, RandomIdGenerator, ID_ALPHABET, ID_LENGTH};
pub use message::{Message, MessageState};
pub use types::{
    ExpiryHours, ExternalId, MessageKind, ViewLimit, DEFAULT_EXPIRY_HOURS, DEFAULT_VIEW_LIMIT,
    MAX_EXPIRY_HOURS, MAX_VIEW_LIMIT, MIN_EXPIRY_HOURS, MIN_VIEW_LIMIT,
};
