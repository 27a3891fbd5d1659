//! Approval and user-input reductions.
//!
//! An approval request is first tested against the thread's allowlist of
//! remembered rules; a match resolves it immediately and asks the caller to
//! acknowledge upstream, so the user never sees it. Everything else waits in
//! the pending list until resolved exactly once.

use tracing::{debug, info};

use crate::models::{ApprovalDecision, ApprovalRequest, PendingUserInputRequest, ThreadKey};
use crate::store::{StoreEffect, ThreadStore};

impl ThreadStore {
    pub(crate) fn approval_requested(
        &mut self,
        key: ThreadKey,
        request: ApprovalRequest,
    ) -> Vec<StoreEffect> {
        let record = self.record_mut(&key);

        // Redelivered request: already pending, nothing to do.
        if record.pending_approvals.iter().any(|p| p.id == request.id) {
            debug!(thread = %key, approval = %request.id, "duplicate approval request dropped");
            return Vec::new();
        }

        let rule = request.rule();
        let matched = record
            .allow_rules
            .iter()
            .any(|allowed| allowed.matches(&rule.command, rule.cwd.as_deref()));
        if matched {
            info!(thread = %key, approval = %request.id, "approval auto-resolved by allowlist");
            return vec![StoreEffect::AutoApproved {
                key,
                approval_id: request.id,
                rule,
            }];
        }

        record.pending_approvals.push(request);
        self.touch(&key);
        Vec::new()
    }

    /// Resolve a pending approval exactly once. Unknown ids are dropped; a
    /// "remember" decision adds the request's rule to the thread allowlist.
    pub(crate) fn approval_resolved(
        &mut self,
        key: ThreadKey,
        approval_id: &str,
        decision: ApprovalDecision,
    ) -> Vec<StoreEffect> {
        let record = self.record_mut(&key);
        let Some(position) = record
            .pending_approvals
            .iter()
            .position(|p| p.id == approval_id)
        else {
            debug!(thread = %key, approval = approval_id, "resolution for unknown approval dropped");
            return Vec::new();
        };

        let request = record.pending_approvals.remove(position);
        if decision == ApprovalDecision::ApprovedAlways {
            let rule = request.rule();
            if !record.allow_rules.contains(&rule) {
                record.allow_rules.push(rule);
            }
        }
        self.touch(&key);
        Vec::new()
    }

    pub(crate) fn input_requested(
        &mut self,
        key: ThreadKey,
        request: PendingUserInputRequest,
    ) -> Vec<StoreEffect> {
        let record = self.record_mut(&key);
        if record.pending_inputs.iter().any(|p| p.id == request.id) {
            debug!(thread = %key, input = %request.id, "duplicate input request dropped");
            return Vec::new();
        }
        record.pending_inputs.push(request);
        self.touch(&key);
        Vec::new()
    }

    /// Remove an answered input request. Unknown ids are dropped.
    pub(crate) fn input_answered(&mut self, key: ThreadKey, input_id: &str) -> Vec<StoreEffect> {
        let record = self.record_mut(&key);
        let before = record.pending_inputs.len();
        record.pending_inputs.retain(|p| p.id != input_id);
        if record.pending_inputs.len() != before {
            self.touch(&key);
        }
        Vec::new()
    }
}
