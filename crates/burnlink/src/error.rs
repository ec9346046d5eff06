//! Error taxonomy for the Burnlink service boundary.
//!
//! Every failure a caller can observe is one of these variants. Store and
//! codec failures are logged where they happen and then flattened into
//! `Database` / `Encryption`; their details never leave the service.

use burnlink_core::{ExternalId, ValidationError, MAX_VIEW_LIMIT, MIN_VIEW_LIMIT};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur during Burnlink operations.
#[derive(Debug, Error)]
pub enum BurnlinkError {
    /// Malformed or missing request fields.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// View limit outside the accepted range.
    #[error("view limit must be between {MIN_VIEW_LIMIT} and {MAX_VIEW_LIMIT}, got {0}")]
    InvalidViewLimit(u32),

    /// Unknown, expired, or already consumed. Deliberately says no more.
    #[error("message not found: it has expired or was already read")]
    MessageNotFound,

    /// Stored content failed its integrity check or could not be sealed.
    #[error("message content could not be processed")]
    Encryption,

    /// The generated id is already taken; retry with a fresh one.
    #[error("message id collision; retry")]
    Conflict(ExternalId),

    /// The store failed. Details are logged, not returned.
    #[error("storage is unavailable")]
    Database,

    /// Startup configuration is unusable.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl BurnlinkError {
    /// Stable machine-readable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            BurnlinkError::InvalidInput(_) => ErrorCode::InvalidInput,
            BurnlinkError::InvalidViewLimit(_) => ErrorCode::InvalidViewLimit,
            BurnlinkError::MessageNotFound => ErrorCode::MessageNotFound,
            BurnlinkError::Encryption => ErrorCode::EncryptionError,
            BurnlinkError::Conflict(_) => ErrorCode::Conflict,
            BurnlinkError::Database => ErrorCode::DatabaseError,
            BurnlinkError::Config(_) => ErrorCode::ConfigError,
        }
    }

    /// HTTP-style status class for presentation layers.
    pub fn status(&self) -> u16 {
        self.code().status()
    }

    /// Whether presentation should show the "not found / already read" state.
    pub fn is_not_found(&self) -> bool {
        matches!(self, BurnlinkError::MessageNotFound)
    }

    /// Whether the caller can fix the request.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status())
    }
}

impl From<ValidationError> for BurnlinkError {
    fn from(e: ValidationError) -> Self {
        match e {
            ValidationError::InvalidViewLimit { got, .. } => BurnlinkError::InvalidViewLimit(got),
            other => BurnlinkError::InvalidInput(other.to_string()),
        }
    }
}

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidInput,
    InvalidViewLimit,
    MessageNotFound,
    EncryptionError,
    Conflict,
    DatabaseError,
    ConfigError,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::InvalidViewLimit => "INVALID_VIEW_LIMIT",
            ErrorCode::MessageNotFound => "MESSAGE_NOT_FOUND",
            ErrorCode::EncryptionError => "ENCRYPTION_ERROR",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::ConfigError => "CONFIG_ERROR",
        }
    }

    pub const fn status(&self) -> u16 {
        match self {
            ErrorCode::InvalidInput | ErrorCode::InvalidViewLimit => 400,
            ErrorCode::MessageNotFound => 404,
            ErrorCode::Conflict => 409,
            ErrorCode::EncryptionError | ErrorCode::DatabaseError | ErrorCode::ConfigError => 500,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serializable error payload: a stable code plus a human message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
}

impl From<&BurnlinkError> for ErrorBody {
    fn from(e: &BurnlinkError) -> Self {
        Self {
            code: e.code(),
            message: e.to_string(),
        }
    }
}

/// Result type for Burnlink operations.
pub type Result<T> = std::result::Result<T, BurnlinkError>;
