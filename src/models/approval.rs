//! Approval and user-input request types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A remembered approval shape.
///
/// When the user approves a request with "remember this", the request's
/// proposed rule is stored and future requests with the same shape are
/// auto-approved without surfacing. Matching is component-wise equality:
/// same command argv and same working directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AllowRule {
    /// Exact command argv this rule covers
    pub command: Vec<String>,
    /// Working directory the command must run in; `None` matches only
    /// requests that also carry no directory
    pub cwd: Option<String>,
}

impl AllowRule {
    /// Whether this rule covers the given request shape.
    pub fn matches(&self, command: &[String], cwd: Option<&str>) -> bool {
        self.command == command && self.cwd.as_deref() == cwd
    }
}

/// How a pending approval was (or should be) resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalDecision {
    Approved,
    /// Approved, and the request's rule is added to the thread allowlist
    ApprovedAlways,
    Denied,
}

impl ApprovalDecision {
    pub fn is_approved(&self) -> bool {
        matches!(
            self,
            ApprovalDecision::Approved | ApprovalDecision::ApprovedAlways
        )
    }
}

/// A permission request raised by the agent mid-turn.
///
/// Resolved exactly once; a resolved request is removed from the pending
/// list and never resurrected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApprovalRequest {
    /// Unique id used when answering the backend
    pub id: String,
    /// Short description of what the agent wants to do
    pub description: String,
    /// The command the agent proposes to run
    #[serde(default)]
    pub command: Vec<String>,
    /// Working directory for the command
    #[serde(default)]
    pub cwd: Option<String>,
    /// Rule to remember if the user picks "approve always"
    #[serde(default)]
    pub proposed_rule: Option<AllowRule>,
    /// When the request was received
    #[serde(default = "Utc::now")]
    pub received_at: DateTime<Utc>,
}

impl ApprovalRequest {
    /// The rule that auto-approving this request would add: the proposed
    /// rule if the backend sent one, otherwise the request's own shape.
    pub fn rule(&self) -> AllowRule {
        self.proposed_rule.clone().unwrap_or(AllowRule {
            command: self.command.clone(),
            cwd: self.cwd.clone(),
        })
    }
}

/// A direct question raised by the agent mid-turn.
///
/// Independent of the approval lifecycle; answered exactly once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingUserInputRequest {
    /// Unique id used when answering the backend
    pub id: String,
    /// The question text shown to the user
    pub prompt: String,
    /// Optional preset answers
    #[serde(default)]
    pub options: Vec<String>,
    /// When the request was received
    #[serde(default = "Utc::now")]
    pub received_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_allow_rule_matches_component_wise() {
        let rule = AllowRule {
            command: argv(&["cargo", "test"]),
            cwd: Some("/repo".to_string()),
        };

        assert!(rule.matches(&argv(&["cargo", "test"]), Some("/repo")));
        assert!(!rule.matches(&argv(&["cargo", "test"]), Some("/other")));
        assert!(!rule.matches(&argv(&["cargo", "build"]), Some("/repo")));
        assert!(!rule.matches(&argv(&["cargo", "test"]), None));
    }

    #[test]
    fn test_request_rule_falls_back_to_own_shape() {
        let request = ApprovalRequest {
            id: "a-1".to_string(),
            description: "run tests".to_string(),
            command: argv(&["cargo", "test"]),
            cwd: Some("/repo".to_string()),
            proposed_rule: None,
            received_at: Utc::now(),
        };

        let rule = request.rule();
        assert!(rule.matches(&argv(&["cargo", "test"]), Some("/repo")));
    }

    #[test]
    fn test_decision_is_approved() {
        assert!(ApprovalDecision::Approved.is_approved());
        assert!(ApprovalDecision::ApprovedAlways.is_approved());
        assert!(!ApprovalDecision::Denied.is_approved());
    }
}
