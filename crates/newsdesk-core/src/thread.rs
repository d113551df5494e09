//! Threads and the messages they hold

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A conversation session on the assistant vendor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    #[serde(default)]
    pub created_at: i64,
}

/// Author of a thread message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A message in a thread
///
/// Messages are only ever read back in the order the vendor lists them; this
/// crate never reorders them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadMessage {
    pub id: String,
    #[serde(default)]
    pub thread_id: String,
    pub role: Role,
    #[serde(default)]
    pub content: Vec<MessageContent>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
}

impl ThreadMessage {
    /// Concatenated text of all text parts
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(MessageContent::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// One part of a message's content
///
/// Only text parts are interpreted. Every other field the vendor sends is
/// kept in `extra` so the part can be handed back to callers verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageContent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextContent>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MessageContent {
    /// Build a plain text part
    pub fn text_part(value: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: Some(TextContent {
                value: value.into(),
                annotations: Vec::new(),
            }),
            extra: Map::new(),
        }
    }

    /// Text value, if this is a text part
    pub fn text(&self) -> Option<&str> {
        self.text.as_ref().map(|t| t.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub value: String,
    #[serde(default)]
    pub annotations: Vec<Value>,
}
