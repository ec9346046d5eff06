//! The message entity.
//!
//! A `Message` is the only thing Burnlink persists. Its content is already
//! sealed by the codec; nothing in this module ever sees plaintext.

use serde::{Deserialize, Serialize};

use crate::types::{ExpiryHours, ExternalId, MessageKind, ViewLimit};

/// Where a message sits in its lifecycle at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageState {
    /// Views remain and the deadline has not passed.
    Active,
    /// The view budget is spent.
    Exhausted,
    /// The deadline has passed.
    Expired,
}

impl MessageState {
    /// Terminal states never return to `Active`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, MessageState::Active)
    }
}

/// A stored one-time message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Public handle; immutable and unique.
    pub external_id: ExternalId,
    /// Sealed content token. Written once.
    pub ciphertext: String,
    /// How the decoded content is interpreted.
    pub kind: MessageKind,
    /// Creation instant (Unix ms).
    pub created_at: i64,
    /// Hard deadline (Unix ms), independent of views.
    pub expires_at: i64,
    /// Maximum successful reads.
    pub view_limit: u32,
    /// Successful reads so far.
    pub view_count: u32,
    /// False once `view_count` reaches `view_limit`.
    pub is_active: bool,
}

impl Message {
    /// A freshly created message with no views spent.
    pub fn new(
        external_id: ExternalId,
        ciphertext: String,
        kind: MessageKind,
        view_limit: ViewLimit,
        expiry: ExpiryHours,
        now: i64,
    ) -> Self {
        Self {
            external_id,
            ciphertext,
            kind,
            created_at: now,
            expires_at: expiry.deadline_from(now),
            view_limit: view_limit.get(),
            view_count: 0,
            is_active: true,
        }
    }

    /// The active predicate: `is_active && expires_at > now`.
    ///
    /// Every lookup applies this; a record failing it is treated as absent.
    pub fn is_visible(&self, now: i64) -> bool {
        self.is_active && self.expires_at > now
    }

    /// Classify the message at `now`.
    pub fn state(&self, now: i64) -> MessageState {
        if !self.is_active || self.view_count >= self.view_limit {
            MessageState::Exhausted
        } else if self.expires_at <= now {
            MessageState::Expired
        } else {
            MessageState::Active
        }
    }

    /// Spend one view and recompute `is_active`.
    ///
    /// Stores call this inside their atomic consume; it never pushes
    /// `view_count` past `view_limit`.
    pub fn record_view(&mut self) {
        if self.view_count < self.view_limit {
            self.view_count += 1;
        }
        self.is_active = self.view_count < self.view_limit;
    }

    /// Views left after the reads recorded so far.
    pub fn remaining_views(&self) -> u32 {
        self.view_limit.saturating_sub(self.view_count)
    }

    /// True when the budget is spent, i.e. the read that produced this
    /// record was the last one.
    pub fn is_last_view(&self) -> bool {
        self.remaining_views() == 0
    }
}
