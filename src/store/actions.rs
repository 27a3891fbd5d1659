//! Actions applied to the thread store.
//!
//! Every mutation of per-thread state goes through one of these, whether it
//! originated from a routed server event or from a user gesture. The reducer
//! treats inapplicable actions as no-ops, so redelivered or stale actions are
//! always safe to apply.

use crate::models::{
    AllowRule, ApprovalDecision, ApprovalRequest, ConversationItem, PendingUserInputRequest,
    RateLimitSnapshot, ThreadKey, TokenUsage,
};

/// A single state transition request for the thread store.
#[derive(Debug, Clone, PartialEq)]
pub enum ThreadAction {
    // -- Turn lifecycle (from routed events) ------------------------------
    TurnStarted {
        key: ThreadKey,
        turn_id: String,
    },
    TurnCompleted {
        key: ThreadKey,
        turn_id: String,
    },
    TurnError {
        key: ThreadKey,
        turn_id: String,
        message: String,
    },
    StatusChanged {
        key: ThreadKey,
        name: Option<String>,
        model: Option<String>,
        effort: Option<String>,
        parent_thread_id: Option<String>,
        is_subagent: Option<bool>,
    },
    Archived {
        key: ThreadKey,
    },
    Unarchived {
        key: ThreadKey,
    },
    Closed {
        key: ThreadKey,
    },
    PlanUpdated {
        key: ThreadKey,
        text: String,
    },
    DiffUpdated {
        key: ThreadKey,
        text: String,
    },
    TokenUsageUpdated {
        key: ThreadKey,
        usage: TokenUsage,
    },
    RateLimitsUpdated {
        key: ThreadKey,
        limits: RateLimitSnapshot,
    },

    // -- Transcript items (from routed events) ----------------------------
    ItemStarted {
        key: ThreadKey,
        item: ConversationItem,
    },
    ItemCompleted {
        key: ThreadKey,
        item_id: String,
    },
    MessageDelta {
        key: ThreadKey,
        item_id: String,
        delta: String,
    },
    ReasoningDelta {
        key: ThreadKey,
        item_id: String,
        delta: String,
    },
    ReasoningBoundary {
        key: ThreadKey,
        item_id: String,
    },
    PlanDelta {
        key: ThreadKey,
        item_id: String,
        delta: String,
    },
    CommandOutputDelta {
        key: ThreadKey,
        item_id: String,
        delta: String,
    },
    TerminalInteraction {
        key: ThreadKey,
        item_id: String,
        data: String,
    },
    FileChangeOutputDelta {
        key: ThreadKey,
        item_id: String,
        delta: String,
    },

    // -- Approvals / user input -------------------------------------------
    ApprovalRequested {
        key: ThreadKey,
        request: ApprovalRequest,
    },
    ApprovalResolved {
        key: ThreadKey,
        approval_id: String,
        decision: ApprovalDecision,
    },
    InputRequested {
        key: ThreadKey,
        request: PendingUserInputRequest,
    },
    InputAnswered {
        key: ThreadKey,
        input_id: String,
    },

    // -- User gestures ------------------------------------------------------
    /// The user asked for the active turn to be stopped; sets the
    /// pending-interrupt marker so the eventual completion is expected
    InterruptRequested {
        key: ThreadKey,
    },
    SetHidden {
        key: ThreadKey,
        hidden: bool,
    },
    RenameThread {
        key: ThreadKey,
        name: Option<String>,
    },
}

impl ThreadAction {
    /// The thread this action addresses.
    pub fn key(&self) -> &ThreadKey {
        match self {
            ThreadAction::TurnStarted { key, .. }
            | ThreadAction::TurnCompleted { key, .. }
            | ThreadAction::TurnError { key, .. }
            | ThreadAction::StatusChanged { key, .. }
            | ThreadAction::Archived { key }
            | ThreadAction::Unarchived { key }
            | ThreadAction::Closed { key }
            | ThreadAction::PlanUpdated { key, .. }
            | ThreadAction::DiffUpdated { key, .. }
            | ThreadAction::TokenUsageUpdated { key, .. }
            | ThreadAction::RateLimitsUpdated { key, .. }
            | ThreadAction::ItemStarted { key, .. }
            | ThreadAction::ItemCompleted { key, .. }
            | ThreadAction::MessageDelta { key, .. }
            | ThreadAction::ReasoningDelta { key, .. }
            | ThreadAction::ReasoningBoundary { key, .. }
            | ThreadAction::PlanDelta { key, .. }
            | ThreadAction::CommandOutputDelta { key, .. }
            | ThreadAction::TerminalInteraction { key, .. }
            | ThreadAction::FileChangeOutputDelta { key, .. }
            | ThreadAction::ApprovalRequested { key, .. }
            | ThreadAction::ApprovalResolved { key, .. }
            | ThreadAction::InputRequested { key, .. }
            | ThreadAction::InputAnswered { key, .. }
            | ThreadAction::InterruptRequested { key }
            | ThreadAction::SetHidden { key, .. }
            | ThreadAction::RenameThread { key, .. } => key,
        }
    }
}

/// Side effects a reduction asks the caller to perform.
///
/// The reducer itself never talks to the backend; when an approval request
/// matches the thread allowlist it is resolved internally and the caller is
/// told to send the answer upstream.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEffect {
    /// An approval request matched an allow rule and was auto-approved;
    /// the caller must acknowledge it to the backend
    AutoApproved {
        key: ThreadKey,
        approval_id: String,
        rule: AllowRule,
    },
}
