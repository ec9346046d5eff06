//! Proptest generators for property-based testing.

use proptest::prelude::*;

use burnlink::CreateOptions;
use burnlink_core::{
    MessageKind, MAX_EXPIRY_HOURS, MAX_VIEW_LIMIT, MIN_EXPIRY_HOURS, MIN_VIEW_LIMIT,
};

/// Content with at least one non-whitespace character.
pub fn content() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9][a-zA-Z0-9 .,!?\n]{0,200}",
        any::<String>().prop_filter("non-blank", |s| !s.trim().is_empty()),
    ]
}

/// Empty or whitespace-only content.
pub fn blank_content() -> impl Strategy<Value = String> {
    "[ \t\r\n]{0,8}".prop_map(String::from)
}

/// An accepted view limit.
pub fn view_limit() -> impl Strategy<Value = u32> {
    MIN_VIEW_LIMIT..=MAX_VIEW_LIMIT
}

/// A view limit outside the accepted range.
pub fn invalid_view_limit() -> impl Strategy<Value = u32> {
    prop_oneof![Just(0u32), (MAX_VIEW_LIMIT + 1)..=1000u32]
}

/// An accepted lifetime in hours.
pub fn expiry_hours() -> impl Strategy<Value = u32> {
    MIN_EXPIRY_HOURS..=MAX_EXPIRY_HOURS
}

/// A lifetime outside the accepted range.
pub fn invalid_expiry_hours() -> impl Strategy<Value = u32> {
    prop_oneof![Just(0u32), (MAX_EXPIRY_HOURS + 1)..=10_000u32]
}

/// Generate a MessageKind.
pub fn message_kind() -> impl Strategy<Value = MessageKind> {
    prop_oneof![Just(MessageKind::Simple), Just(MessageKind::Compound)]
}

/// Wrap text as a minimal rich-content document.
pub fn compound_document(text: &str) -> String {
    serde_json::json!([{ "type": "paragraph", "children": [{ "text": text }] }]).to_string()
}

/// Parameters for a valid create call.
#[derive(Debug, Clone)]
pub struct CreateParams {
    pub content: String,
    pub view_limit: u32,
    pub expiry_hours: u32,
    pub kind: MessageKind,
}

impl CreateParams {
    pub fn to_options(&self) -> CreateOptions {
        CreateOptions::new(self.content.clone())
            .view_limit(self.view_limit)
            .expiry_hours(self.expiry_hours)
            .kind(self.kind)
    }
}

impl Arbitrary for CreateParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (content(), view_limit(), expiry_hours(), message_kind())
            .prop_map(|(text, view_limit, expiry_hours, kind)| CreateParams {
                content: match kind {
                    MessageKind::Simple => text,
                    MessageKind::Compound => compound_document(&text),
                },
                view_limit,
                expiry_hours,
                kind,
            })
            .boxed()
    }
}
