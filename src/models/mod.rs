//! Core data model for workspaces, threads, transcript items, and approvals.
//!
//! These types mirror what the backend sends over the event stream and what
//! the store keeps per thread. Everything here is plain data; behavior lives
//! in the store, router, and controllers.

mod approval;
mod item;
mod prediction;
mod thread;

use serde::{Deserialize, Serialize};

pub use approval::{AllowRule, ApprovalDecision, ApprovalRequest, PendingUserInputRequest};
pub use item::{ConversationItem, ItemContent, ItemRole};
pub use prediction::PredictionModel;
pub use thread::{RateLimitSnapshot, ThreadRecord, ThreadSummary, TokenUsage, TurnStatus};

/// Identifies a thread within a workspace.
///
/// Every event, store action, and accessor is keyed by this pair; thread ids
/// are only unique within their workspace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ThreadKey {
    pub workspace_id: String,
    pub thread_id: String,
}

impl ThreadKey {
    pub fn new(workspace_id: impl Into<String>, thread_id: impl Into<String>) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            thread_id: thread_id.into(),
        }
    }
}

impl std::fmt::Display for ThreadKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.workspace_id, self.thread_id)
    }
}
