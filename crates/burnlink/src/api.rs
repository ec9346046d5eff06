//! The external boundary: `createMessage` and `readMessage`.
//!
//! Request and response shapes are serde types with camelCase fields, so a
//! presentation layer can pass JSON straight through.

use burnlink_core::{ExternalId, MessageKind, DEFAULT_EXPIRY_HOURS, DEFAULT_VIEW_LIMIT};
use burnlink_store::Store;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::service::{CreateOptions, MessageService, ReadOutcome};

/// Body of a `createMessage` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageRequest {
    pub content: String,
    /// Lifetime in hours.
    #[serde(default = "default_expire_at")]
    pub expire_at: u32,
    #[serde(default = "default_view_limit")]
    pub view_limit: u32,
    #[serde(default, alias = "type")]
    pub kind: MessageKind,
}

fn default_expire_at() -> u32 {
    DEFAULT_EXPIRY_HOURS
}

fn default_view_limit() -> u32 {
    DEFAULT_VIEW_LIMIT
}

impl From<CreateMessageRequest> for CreateOptions {
    fn from(req: CreateMessageRequest) -> Self {
        CreateOptions::new(req.content)
            .expiry_hours(req.expire_at)
            .view_limit(req.view_limit)
            .kind(req.kind)
    }
}

/// Result of a `readMessage` call.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadMessageResponse {
    pub content: String,
    pub remaining_views: u32,
    pub is_last_view: bool,
    pub kind: MessageKind,
}

impl From<ReadOutcome> for ReadMessageResponse {
    fn from(outcome: ReadOutcome) -> Self {
        Self {
            content: outcome.content,
            remaining_views: outcome.remaining_views,
            is_last_view: outcome.is_last_view,
            kind: outcome.kind,
        }
    }
}

impl std::fmt::Debug for ReadMessageResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadMessageResponse")
            .field("content", &"<redacted>")
            .field("remaining_views", &self.remaining_views)
            .field("is_last_view", &self.is_last_view)
            .field("kind", &self.kind)
            .finish()
    }
}

impl<S: Store + 'static> MessageService<S> {
    /// `createMessage`: store a new message and return its id.
    pub async fn create_message(&self, request: CreateMessageRequest) -> Result<ExternalId> {
        self.create(request.into()).await
    }

    /// `readMessage`: consume one view.
    pub async fn read_message(&self, id: &str) -> Result<ReadMessageResponse> {
        self.read(id).await.map(Into::into)
    }
}

/// Build the share link for a message: `{origin}/message/{id}`.
pub fn share_link(origin: &str, id: &ExternalId) -> String {
    format!("{}/message/{}", origin.trim_end_matches('/'), id)
}
