//! Transcript item types.
//!
//! A `ConversationItem` is one append-only unit of transcript content. It is
//! created by an item-started event, optionally grown by streaming deltas,
//! and finalized by an item-completed event. Items are never reordered; only
//! thread-level hide/archive affects what the user sees.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who (or what) produced an item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ItemRole {
    User,
    Assistant,
    System,
}

/// The kind-specific payload of a transcript item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemContent {
    /// A chat message; `text` grows via message deltas
    Message { role: ItemRole, text: String },
    /// Agent reasoning; `text` grows via reasoning deltas, `sections`
    /// counts boundary markers between reasoning blocks
    Reasoning { text: String, sections: u32 },
    /// A proposed or updated plan; grows via plan deltas
    Plan { text: String },
    /// A shell command invocation; `output` grows via output deltas
    Command {
        command: Vec<String>,
        cwd: Option<String>,
        output: String,
        exit_code: Option<i32>,
    },
    /// A file change being applied; `output` grows via output deltas
    FileChange { path: String, output: String },
    /// A unified diff produced by the agent
    Diff { text: String },
    /// An error surfaced into the transcript (turn failures land here)
    Error { message: String },
}

impl ItemContent {
    /// The streamed text body of this item, if it has one.
    pub fn text(&self) -> Option<&str> {
        match self {
            ItemContent::Message { text, .. }
            | ItemContent::Reasoning { text, .. }
            | ItemContent::Plan { text }
            | ItemContent::Diff { text } => Some(text),
            ItemContent::Command { output, .. } | ItemContent::FileChange { output, .. } => {
                Some(output)
            }
            ItemContent::Error { message } => Some(message),
        }
    }

    /// Short label used when rendering this item as a context line.
    pub fn role_label(&self) -> &'static str {
        match self {
            ItemContent::Message {
                role: ItemRole::User,
                ..
            } => "User",
            ItemContent::Message { .. } => "Assistant",
            ItemContent::Reasoning { .. } => "Reasoning",
            ItemContent::Plan { .. } => "Plan",
            ItemContent::Command { .. } => "Command",
            ItemContent::FileChange { .. } => "FileChange",
            ItemContent::Diff { .. } => "Diff",
            ItemContent::Error { .. } => "Error",
        }
    }
}

/// One ordered unit of transcript content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationItem {
    /// Item id; deltas address the item through it
    pub id: String,
    /// Kind-specific payload
    #[serde(flatten)]
    pub content: ItemContent,
    /// Set once the item-completed event has arrived
    #[serde(default)]
    pub completed: bool,
    /// When the item was first seen
    #[serde(default = "Utc::now")]
    pub started_at: DateTime<Utc>,
}

impl ConversationItem {
    pub fn new(id: impl Into<String>, content: ItemContent) -> Self {
        Self {
            id: id.into(),
            content,
            completed: false,
            started_at: Utc::now(),
        }
    }

    /// Create a locally generated error item (turn failures).
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(
            format!("err-{}", Uuid::new_v4()),
            ItemContent::Error {
                message: message.into(),
            },
        )
    }

    /// Whether this item is a user-authored message.
    pub fn is_user_message(&self) -> bool {
        matches!(
            self.content,
            ItemContent::Message {
                role: ItemRole::User,
                ..
            }
        )
    }
}
