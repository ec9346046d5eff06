//! Strong type definitions for Burnlink.
//!
//! Policy values are newtypes that can only be built through validation, so a
//! `ViewLimit` or `ExpiryHours` in hand is always inside the accepted range.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::id::is_id_char;

/// Smallest accepted view budget.
pub const MIN_VIEW_LIMIT: u32 = 1;
/// Largest accepted view budget.
pub const MAX_VIEW_LIMIT: u32 = 10;
/// View budget used when the caller does not pick one.
pub const DEFAULT_VIEW_LIMIT: u32 = 1;

/// Shortest accepted lifetime, in hours.
pub const MIN_EXPIRY_HOURS: u32 = 1;
/// Longest accepted lifetime, in hours (one week).
pub const MAX_EXPIRY_HOURS: u32 = 168;
/// Lifetime used when the caller does not pick one.
pub const DEFAULT_EXPIRY_HOURS: u32 = 24;

/// Upper bound on external id length accepted from callers.
const MAX_ID_LEN: usize = 64;

const MILLIS_PER_HOUR: i64 = 60 * 60 * 1000;

/// The public handle of a message, embedded in share links.
///
/// Only characters from the URL-safe alphabet `A-Za-z0-9_-` are allowed.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExternalId(String);

impl ExternalId {
    /// Parse and validate an id supplied by a caller.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::EmptyId);
        }
        if s.len() > MAX_ID_LEN {
            return Err(ValidationError::MalformedId(format!(
                "longer than {} characters",
                MAX_ID_LEN
            )));
        }
        if let Some(c) = s.chars().find(|c| !is_id_char(*c)) {
            return Err(ValidationError::MalformedId(format!(
                "unexpected character {:?}",
                c
            )));
        }
        Ok(Self(s.to_owned()))
    }

    /// Wrap a string that is already known to be valid.
    pub(crate) fn from_trusted(s: String) -> Self {
        Self(s)
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A short prefix for logs. The full id grants access to the message,
    /// so only this prefix is ever logged.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(6)]
    }
}

impl fmt::Debug for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExternalId({}..)", self.short())
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ExternalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ExternalId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ExternalId {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)?;
        Ok(Self(s))
    }
}

impl From<ExternalId> for String {
    fn from(id: ExternalId) -> Self {
        id.0
    }
}

/// How message content should be interpreted by a reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Raw text.
    #[default]
    Simple,
    /// A structured rich-content document serialized as JSON.
    Compound,
}

impl MessageKind {
    /// Stable string form, used in storage and on the wire.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Simple => "simple",
            MessageKind::Compound => "compound",
        }
    }

    /// Check that `content` is acceptable for this kind.
    ///
    /// Compound content must be a JSON document; simple content is free text.
    pub fn validate_content(&self, content: &str) -> Result<(), ValidationError> {
        match self {
            MessageKind::Simple => Ok(()),
            MessageKind::Compound => serde_json::from_str::<serde_json::Value>(content)
                .map(|_| ())
                .map_err(|e| ValidationError::InvalidCompoundContent(e.to_string())),
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple" => Ok(MessageKind::Simple),
            "compound" => Ok(MessageKind::Compound),
            other => Err(ValidationError::UnknownKind(other.to_owned())),
        }
    }
}

/// Maximum number of successful reads, in `MIN_VIEW_LIMIT..=MAX_VIEW_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewLimit(u32);

impl ViewLimit {
    pub fn new(limit: u32) -> Result<Self, ValidationError> {
        if (MIN_VIEW_LIMIT..=MAX_VIEW_LIMIT).contains(&limit) {
            Ok(Self(limit))
        } else {
            Err(ValidationError::InvalidViewLimit {
                got: limit,
                min: MIN_VIEW_LIMIT,
                max: MAX_VIEW_LIMIT,
            })
        }
    }

    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl Default for ViewLimit {
    fn default() -> Self {
        Self(DEFAULT_VIEW_LIMIT)
    }
}

/// Message lifetime in hours, in `MIN_EXPIRY_HOURS..=MAX_EXPIRY_HOURS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExpiryHours(u32);

impl ExpiryHours {
    pub fn new(hours: u32) -> Result<Self, ValidationError> {
        if (MIN_EXPIRY_HOURS..=MAX_EXPIRY_HOURS).contains(&hours) {
            Ok(Self(hours))
        } else {
            Err(ValidationError::InvalidExpiry {
                got: hours,
                min: MIN_EXPIRY_HOURS,
                max: MAX_EXPIRY_HOURS,
            })
        }
    }

    pub const fn get(&self) -> u32 {
        self.0
    }

    /// The absolute deadline for a message created at `now` (Unix ms).
    pub fn deadline_from(&self, now: i64) -> i64 {
        now.saturating_add(self.0 as i64 * MILLIS_PER_HOUR)
    }
}

impl Default for ExpiryHours {
    fn default() -> Self {
        Self(DEFAULT_EXPIRY_HOURS)
    }
}
