//! Thread, turn, and workspace types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ApprovalRequest, ConversationItem, PendingUserInputRequest};

/// Lifecycle of the single turn a thread may have in flight.
///
/// `Active` carries the turn id used to gate out-of-order completion events:
/// a completion whose id does not match the active id belongs to a superseded
/// turn and is ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    /// No turn has run yet, or the thread is idle after a reset
    #[default]
    None,
    /// A turn is in flight
    Active { turn_id: String },
    /// The last turn finished normally
    Completed,
    /// The last turn failed; an error item was appended to the transcript
    Error,
    /// The last turn was stopped at the user's request
    Interrupted,
}

impl TurnStatus {
    /// The id of the in-flight turn, if any.
    pub fn active_turn_id(&self) -> Option<&str> {
        match self {
            TurnStatus::Active { turn_id } => Some(turn_id),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, TurnStatus::Active { .. })
    }
}

/// Token usage reported by the backend for a thread.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TokenUsage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub cached_input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// Rate-limit window snapshot pushed by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RateLimitSnapshot {
    /// Percentage of the primary window already consumed (0-100)
    #[serde(default)]
    pub primary_used_percent: f64,
    /// Percentage of the secondary window already consumed (0-100)
    #[serde(default)]
    pub secondary_used_percent: f64,
    /// Minutes until the primary window resets
    #[serde(default)]
    pub primary_resets_in_minutes: Option<u64>,
}

/// Everything the store keeps for one thread.
///
/// Created lazily when the first event for an unknown (workspace, thread)
/// pair arrives, so event order relative to thread-list loading never
/// matters.
#[derive(Debug, Clone, Default)]
pub struct ThreadRecord {
    /// Display name reported by the backend
    pub name: Option<String>,
    /// Name set locally by the user; wins over `name` for display
    pub custom_name: Option<String>,
    /// Model id the thread currently runs on
    pub model: Option<String>,
    /// Reasoning effort setting ("low", "medium", "high")
    pub effort: Option<String>,
    /// Parent thread id when this thread is a sub-agent of another
    pub parent_thread_id: Option<String>,
    /// Whether the backend flagged this thread as a sub-agent
    pub is_subagent: bool,
    /// Current turn lifecycle
    pub turn: TurnStatus,
    /// Set while the user has asked for the active turn to be stopped.
    /// A completion event arriving with this flag set is the interrupt
    /// landing, not a normal completion.
    pub pending_interrupt: bool,
    /// Ordered, append-only transcript
    pub items: Vec<ConversationItem>,
    /// Approval requests awaiting a user decision
    pub pending_approvals: Vec<ApprovalRequest>,
    /// Rules from earlier "approve and remember" decisions
    pub allow_rules: Vec<crate::models::AllowRule>,
    /// Direct questions awaiting a user answer
    pub pending_inputs: Vec<PendingUserInputRequest>,
    /// Latest agent plan text, if any
    pub plan: Option<String>,
    /// Latest aggregated diff text, if any
    pub diff: Option<String>,
    /// Most recent token usage snapshot
    pub token_usage: Option<TokenUsage>,
    /// Most recent rate-limit snapshot
    pub rate_limits: Option<RateLimitSnapshot>,
    /// When the thread was created
    pub created_at: Option<DateTime<Utc>>,
    /// When the thread last changed
    pub updated_at: Option<DateTime<Utc>>,
}

impl ThreadRecord {
    /// The name shown in thread rows: the user's custom name if set,
    /// otherwise the backend-reported one.
    pub fn display_name(&self) -> Option<&str> {
        self.custom_name.as_deref().or(self.name.as_deref())
    }
}

/// Flat, display-oriented view of a thread used by the row view cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadSummary {
    pub id: String,
    pub workspace_id: String,
    pub name: Option<String>,
    pub is_subagent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
