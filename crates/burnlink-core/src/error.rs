//! Error types for Burnlink Core.

use thiserror::Error;

/// Errors produced while validating creation or lookup inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("content must not be empty")]
    EmptyContent,

    #[error("view limit must be between {min} and {max}, got {got}")]
    InvalidViewLimit { got: u32, min: u32, max: u32 },

    #[error("expiry must be between {min} and {max} hours, got {got}")]
    InvalidExpiry { got: u32, min: u32, max: u32 },

    #[error("message id must not be empty")]
    EmptyId,

    #[error("malformed message id: {0}")]
    MalformedId(String),

    #[error("unknown message kind: {0}")]
    UnknownKind(String),

    #[error("compound content must be a JSON document: {0}")]
    InvalidCompoundContent(String),
}

/// Errors from the token codec.
///
/// Decode failures are deliberately coarse: a caller learns that a token is
/// unusable, never which byte was wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("no secret key configured")]
    MissingKey,

    #[error("invalid secret key: {0}")]
    InvalidKey(String),

    #[error("malformed token: {0}")]
    MalformedToken(String),

    #[error("unsupported token version: {0}")]
    UnsupportedVersion(u8),

    #[error("token failed integrity check")]
    Integrity,

    #[error("encryption failed")]
    Encryption,

    #[error("decrypted content is not valid UTF-8")]
    InvalidUtf8,
}
