//! Server event types pushed over the backend stream.
//!
//! Every event carries a (workspace, thread) attribution in its metadata and
//! a method name that selects the payload shape. Unknown methods are never an
//! error; they parse into [`EventKind::Unrouted`] and are recorded as
//! diagnostics by the router, which keeps the client forward compatible with
//! new event kinds.

use serde::Deserialize;

use crate::models::{
    ApprovalRequest, ConversationItem, PendingUserInputRequest, RateLimitSnapshot, ThreadKey,
    TokenUsage,
};

/// Attribution metadata sent flattened at the root of each event payload.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
pub struct EventMeta {
    /// Workspace the event belongs to
    #[serde(default)]
    pub workspace_id: Option<String>,
    /// Thread the event belongs to
    #[serde(default)]
    pub thread_id: Option<String>,
}

impl EventMeta {
    /// The (workspace, thread) key, when both halves are present.
    pub fn key(&self) -> Option<ThreadKey> {
        match (&self.workspace_id, &self.thread_id) {
            (Some(ws), Some(th)) => Some(ThreadKey::new(ws.clone(), th.clone())),
            _ => None,
        }
    }
}

/// A fully parsed server event: attribution plus typed payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerEvent {
    pub meta: EventMeta,
    pub kind: EventKind,
}

/// Typed event payloads, grouped the way the router handles them.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    // -- Turn lifecycle --------------------------------------------------
    /// A turn began; supersedes any prior active turn on the thread
    TurnStarted { turn_id: String },
    /// A turn finished normally (or an interrupt landed)
    TurnCompleted { turn_id: String },
    /// A turn failed
    TurnError { turn_id: String, message: String },
    /// Thread metadata changed (name, model, effort, sub-agent linkage)
    ThreadStatusChanged {
        name: Option<String>,
        model: Option<String>,
        effort: Option<String>,
        parent_thread_id: Option<String>,
        is_subagent: Option<bool>,
    },
    /// Thread archived by the backend
    ThreadArchived,
    /// Thread restored from the archive
    ThreadUnarchived,
    /// Thread closed on the backend
    ThreadClosed,
    /// Agent plan replaced wholesale
    PlanUpdated { text: String },
    /// Aggregated diff replaced wholesale
    DiffUpdated { text: String },
    /// Token usage snapshot
    TokenUsageUpdated { usage: TokenUsage },
    /// Rate-limit snapshot
    RateLimitsUpdated { limits: RateLimitSnapshot },

    // -- Item / streaming content ----------------------------------------
    /// A transcript item was opened
    ItemStarted { item: ConversationItem },
    /// A transcript item was finalized
    ItemCompleted { item_id: String },
    /// Text appended to a message item
    MessageDelta { item_id: String, delta: String },
    /// A message item was finalized
    MessageCompleted { item_id: String },
    /// Text appended to a reasoning item
    ReasoningDelta { item_id: String, delta: String },
    /// Boundary between reasoning blocks within one item
    ReasoningBoundary { item_id: String },
    /// Text appended to a plan item
    PlanDelta { item_id: String, delta: String },
    /// Output appended to a command item
    CommandOutputDelta { item_id: String, delta: String },
    /// User keystrokes echoed into a running command's terminal
    TerminalInteraction { item_id: String, data: String },
    /// Output appended to a file-change item
    FileChangeOutputDelta { item_id: String, delta: String },

    // -- Approvals / user input ------------------------------------------
    /// The agent needs permission to proceed
    ApprovalRequested { request: ApprovalRequest },
    /// The agent needs a direct answer from the user
    InputRequested { request: PendingUserInputRequest },

    // -- Everything else --------------------------------------------------
    /// Unrecognized method; recorded as a diagnostic and dropped
    Unrouted { method: String, payload: String },
}

impl EventKind {
    /// Method name for logging and diagnostics.
    pub fn method_name(&self) -> &str {
        match self {
            EventKind::TurnStarted { .. } => "turn_started",
            EventKind::TurnCompleted { .. } => "turn_completed",
            EventKind::TurnError { .. } => "turn_error",
            EventKind::ThreadStatusChanged { .. } => "thread_status_changed",
            EventKind::ThreadArchived => "thread_archived",
            EventKind::ThreadUnarchived => "thread_unarchived",
            EventKind::ThreadClosed => "thread_closed",
            EventKind::PlanUpdated { .. } => "plan_updated",
            EventKind::DiffUpdated { .. } => "diff_updated",
            EventKind::TokenUsageUpdated { .. } => "token_usage_updated",
            EventKind::RateLimitsUpdated { .. } => "rate_limits_updated",
            EventKind::ItemStarted { .. } => "item_started",
            EventKind::ItemCompleted { .. } => "item_completed",
            EventKind::MessageDelta { .. } => "message_delta",
            EventKind::MessageCompleted { .. } => "message_completed",
            EventKind::ReasoningDelta { .. } => "reasoning_delta",
            EventKind::ReasoningBoundary { .. } => "reasoning_boundary",
            EventKind::PlanDelta { .. } => "plan_delta",
            EventKind::CommandOutputDelta { .. } => "command_output_delta",
            EventKind::TerminalInteraction { .. } => "terminal_interaction",
            EventKind::FileChangeOutputDelta { .. } => "file_change_output_delta",
            EventKind::ApprovalRequested { .. } => "approval_requested",
            EventKind::InputRequested { .. } => "input_requested",
            EventKind::Unrouted { method, .. } => method,
        }
    }
}

// Payload shapes for the methods that need more than a raw value lookup.

#[derive(Deserialize)]
struct TurnPayload {
    #[serde(default)]
    turn_id: String,
}

#[derive(Deserialize)]
struct TurnErrorPayload {
    #[serde(default)]
    turn_id: String,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct StatusPayload {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    effort: Option<String>,
    #[serde(default)]
    parent_thread_id: Option<String>,
    #[serde(default)]
    is_subagent: Option<bool>,
}

#[derive(Deserialize)]
struct TextPayload {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ItemStartedPayload {
    item: ConversationItem,
}

#[derive(Deserialize)]
struct ItemRefPayload {
    item_id: String,
}

#[derive(Deserialize)]
struct DeltaPayload {
    item_id: String,
    #[serde(default)]
    delta: String,
}

#[derive(Deserialize)]
struct TerminalPayload {
    item_id: String,
    #[serde(default)]
    data: String,
}

#[derive(Deserialize)]
struct UsagePayload {
    usage: TokenUsage,
}

#[derive(Deserialize)]
struct RateLimitsPayload {
    limits: RateLimitSnapshot,
}

#[derive(Deserialize)]
struct ApprovalPayload {
    request: ApprovalRequest,
}

#[derive(Deserialize)]
struct InputPayload {
    request: PendingUserInputRequest,
}

impl ServerEvent {
    /// Parse an event from its method name and raw JSON payload.
    ///
    /// Never fails: a malformed payload or unknown method produces an
    /// [`EventKind::Unrouted`] event carrying the raw text, so the stream
    /// keeps flowing no matter what the backend sends.
    pub fn parse(method: &str, data: &str) -> ServerEvent {
        let meta: EventMeta = serde_json::from_str(data).unwrap_or_default();

        let kind = match Self::parse_kind(method, data) {
            Some(kind) => kind,
            None => EventKind::Unrouted {
                method: method.to_string(),
                payload: data.to_string(),
            },
        };

        ServerEvent { meta, kind }
    }

    fn parse_kind(method: &str, data: &str) -> Option<EventKind> {
        match method {
            "turn_started" => {
                let p: TurnPayload = serde_json::from_str(data).ok()?;
                Some(EventKind::TurnStarted { turn_id: p.turn_id })
            }
            "turn_completed" => {
                let p: TurnPayload = serde_json::from_str(data).ok()?;
                Some(EventKind::TurnCompleted { turn_id: p.turn_id })
            }
            "turn_error" => {
                let p: TurnErrorPayload = serde_json::from_str(data).ok()?;
                Some(EventKind::TurnError {
                    turn_id: p.turn_id,
                    message: p.message,
                })
            }
            "thread_status_changed" => {
                let p: StatusPayload = serde_json::from_str(data).ok()?;
                Some(EventKind::ThreadStatusChanged {
                    name: p.name,
                    model: p.model,
                    effort: p.effort,
                    parent_thread_id: p.parent_thread_id,
                    is_subagent: p.is_subagent,
                })
            }
            "thread_archived" => Some(EventKind::ThreadArchived),
            "thread_unarchived" => Some(EventKind::ThreadUnarchived),
            "thread_closed" => Some(EventKind::ThreadClosed),
            "plan_updated" => {
                let p: TextPayload = serde_json::from_str(data).ok()?;
                Some(EventKind::PlanUpdated { text: p.text })
            }
            "diff_updated" => {
                let p: TextPayload = serde_json::from_str(data).ok()?;
                Some(EventKind::DiffUpdated { text: p.text })
            }
            "token_usage_updated" => {
                let p: UsagePayload = serde_json::from_str(data).ok()?;
                Some(EventKind::TokenUsageUpdated { usage: p.usage })
            }
            "rate_limits_updated" => {
                let p: RateLimitsPayload = serde_json::from_str(data).ok()?;
                Some(EventKind::RateLimitsUpdated { limits: p.limits })
            }
            "item_started" => {
                let p: ItemStartedPayload = serde_json::from_str(data).ok()?;
                Some(EventKind::ItemStarted { item: p.item })
            }
            "item_completed" => {
                let p: ItemRefPayload = serde_json::from_str(data).ok()?;
                Some(EventKind::ItemCompleted { item_id: p.item_id })
            }
            "message_delta" => {
                let p: DeltaPayload = serde_json::from_str(data).ok()?;
                Some(EventKind::MessageDelta {
                    item_id: p.item_id,
                    delta: p.delta,
                })
            }
            "message_completed" => {
                let p: ItemRefPayload = serde_json::from_str(data).ok()?;
                Some(EventKind::MessageCompleted { item_id: p.item_id })
            }
            "reasoning_delta" => {
                let p: DeltaPayload = serde_json::from_str(data).ok()?;
                Some(EventKind::ReasoningDelta {
                    item_id: p.item_id,
                    delta: p.delta,
                })
            }
            "reasoning_boundary" => {
                let p: ItemRefPayload = serde_json::from_str(data).ok()?;
                Some(EventKind::ReasoningBoundary { item_id: p.item_id })
            }
            "plan_delta" => {
                let p: DeltaPayload = serde_json::from_str(data).ok()?;
                Some(EventKind::PlanDelta {
                    item_id: p.item_id,
                    delta: p.delta,
                })
            }
            "command_output_delta" => {
                let p: DeltaPayload = serde_json::from_str(data).ok()?;
                Some(EventKind::CommandOutputDelta {
                    item_id: p.item_id,
                    delta: p.delta,
                })
            }
            "terminal_interaction" => {
                let p: TerminalPayload = serde_json::from_str(data).ok()?;
                Some(EventKind::TerminalInteraction {
                    item_id: p.item_id,
                    data: p.data,
                })
            }
            "file_change_output_delta" => {
                let p: DeltaPayload = serde_json::from_str(data).ok()?;
                Some(EventKind::FileChangeOutputDelta {
                    item_id: p.item_id,
                    delta: p.delta,
                })
            }
            "approval_requested" => {
                let p: ApprovalPayload = serde_json::from_str(data).ok()?;
                Some(EventKind::ApprovalRequested { request: p.request })
            }
            "input_requested" => {
                let p: InputPayload = serde_json::from_str(data).ok()?;
                Some(EventKind::InputRequested { request: p.request })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_turn_started() {
        let event = ServerEvent::parse(
            "turn_started",
            r#"{"workspace_id": "ws-1", "thread_id": "th-1", "turn_id": "turn-9"}"#,
        );
        assert_eq!(event.meta.key(), Some(ThreadKey::new("ws-1", "th-1")));
        assert_eq!(
            event.kind,
            EventKind::TurnStarted {
                turn_id: "turn-9".to_string()
            }
        );
    }

    #[test]
    fn test_parse_unknown_method_is_unrouted() {
        let event = ServerEvent::parse("shiny_new_thing", r#"{"thread_id": "th-1"}"#);
        match &event.kind {
            EventKind::Unrouted { method, payload } => {
                assert_eq!(method, "shiny_new_thing");
                assert!(payload.contains("th-1"));
            }
            other => panic!("expected unrouted, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_malformed_payload_is_unrouted() {
        let event = ServerEvent::parse("message_delta", "not json at all");
        assert!(matches!(event.kind, EventKind::Unrouted { .. }));
    }

    #[test]
    fn test_parse_message_delta() {
        let event = ServerEvent::parse(
            "message_delta",
            r#"{"workspace_id": "ws", "thread_id": "th", "item_id": "i-1", "delta": "hi"}"#,
        );
        assert_eq!(
            event.kind,
            EventKind::MessageDelta {
                item_id: "i-1".to_string(),
                delta: "hi".to_string(),
            }
        );
    }

    #[test]
    fn test_meta_key_requires_both_halves() {
        let event = ServerEvent::parse("turn_completed", r#"{"turn_id": "t", "thread_id": "th"}"#);
        assert_eq!(event.meta.key(), None);
    }

    #[test]
    fn test_method_name_round_trip() {
        let event = ServerEvent::parse("thread_archived", "{}");
        assert_eq!(event.kind.method_name(), "thread_archived");
    }
}
