//! Normalized per-thread state, keyed by (workspace, thread).
//!
//! The store is the single source of truth the row view cache and the
//! speculative-response controller read from. All mutation goes through
//! [`ThreadStore::apply`], which never fails: inapplicable or redelivered
//! actions reduce to no-ops so the store stays usable after any input.
//!
//! Concurrency guards owned here:
//! - active-turn gating: completion/error events for a turn id other than
//!   the thread's current active turn are ignored (out-of-order defense)
//! - interrupt suppression: a completion arriving while the pending
//!   interrupt marker is set is the interrupt landing, not a normal finish
//! - approval allowlists: requests matching a remembered rule are resolved
//!   without surfacing

mod actions;
mod approvals;
mod items;
mod turns;

use std::collections::{HashMap, HashSet};

use chrono::Utc;

use crate::models::{
    ApprovalRequest, ConversationItem, PendingUserInputRequest, ThreadKey, ThreadRecord,
    ThreadSummary,
};

pub use actions::{StoreEffect, ThreadAction};

/// Owner of all per-thread state.
#[derive(Debug, Default)]
pub struct ThreadStore {
    /// Per-thread records, created lazily on first touch
    pub(crate) records: HashMap<ThreadKey, ThreadRecord>,
    /// Threads the user hid locally; data stays, visibility goes
    pub(crate) hidden: HashSet<ThreadKey>,
    /// Threads archived on the backend
    pub(crate) archived: HashSet<ThreadKey>,
    /// Threads closed on the backend
    pub(crate) closed: HashSet<ThreadKey>,
}

impl ThreadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one action, returning any side effects the caller must run.
    ///
    /// This is the only mutation entry point. It never fails; actions that
    /// do not apply to the current state are dropped.
    pub fn apply(&mut self, action: ThreadAction) -> Vec<StoreEffect> {
        match action {
            ThreadAction::TurnStarted { key, turn_id } => self.turn_started(key, turn_id),
            ThreadAction::TurnCompleted { key, turn_id } => self.turn_completed(key, turn_id),
            ThreadAction::TurnError {
                key,
                turn_id,
                message,
            } => self.turn_error(key, turn_id, message),
            ThreadAction::StatusChanged {
                key,
                name,
                model,
                effort,
                parent_thread_id,
                is_subagent,
            } => self.status_changed(key, name, model, effort, parent_thread_id, is_subagent),
            ThreadAction::Archived { key } => {
                self.archived.insert(key);
                Vec::new()
            }
            ThreadAction::Unarchived { key } => {
                self.archived.remove(&key);
                Vec::new()
            }
            ThreadAction::Closed { key } => {
                self.closed.insert(key);
                Vec::new()
            }
            ThreadAction::PlanUpdated { key, text } => {
                self.record_mut(&key).plan = Some(text);
                self.touch(&key);
                Vec::new()
            }
            ThreadAction::DiffUpdated { key, text } => {
                self.record_mut(&key).diff = Some(text);
                self.touch(&key);
                Vec::new()
            }
            ThreadAction::TokenUsageUpdated { key, usage } => {
                self.record_mut(&key).token_usage = Some(usage);
                Vec::new()
            }
            ThreadAction::RateLimitsUpdated { key, limits } => {
                self.record_mut(&key).rate_limits = Some(limits);
                Vec::new()
            }
            ThreadAction::ItemStarted { key, item } => self.item_started(key, item),
            ThreadAction::ItemCompleted { key, item_id } => self.item_completed(key, &item_id),
            ThreadAction::MessageDelta {
                key,
                item_id,
                delta,
            } => self.message_delta(key, &item_id, &delta),
            ThreadAction::ReasoningDelta {
                key,
                item_id,
                delta,
            } => self.reasoning_delta(key, &item_id, &delta),
            ThreadAction::ReasoningBoundary { key, item_id } => {
                self.reasoning_boundary(key, &item_id)
            }
            ThreadAction::PlanDelta {
                key,
                item_id,
                delta,
            } => self.plan_delta(key, &item_id, &delta),
            ThreadAction::CommandOutputDelta {
                key,
                item_id,
                delta,
            } => self.command_output_delta(key, &item_id, &delta),
            ThreadAction::TerminalInteraction { key, item_id, data } => {
                self.terminal_interaction(key, &item_id, &data)
            }
            ThreadAction::FileChangeOutputDelta {
                key,
                item_id,
                delta,
            } => self.file_change_output_delta(key, &item_id, &delta),
            ThreadAction::ApprovalRequested { key, request } => {
                self.approval_requested(key, request)
            }
            ThreadAction::ApprovalResolved {
                key,
                approval_id,
                decision,
            } => self.approval_resolved(key, &approval_id, decision),
            ThreadAction::InputRequested { key, request } => self.input_requested(key, request),
            ThreadAction::InputAnswered { key, input_id } => self.input_answered(key, &input_id),
            ThreadAction::InterruptRequested { key } => self.interrupt_requested(key),
            ThreadAction::SetHidden { key, hidden } => {
                if hidden {
                    self.hidden.insert(key);
                } else {
                    self.hidden.remove(&key);
                }
                Vec::new()
            }
            ThreadAction::RenameThread { key, name } => {
                self.record_mut(&key).custom_name = name;
                Vec::new()
            }
        }
    }

    // -- Derived accessors ------------------------------------------------

    /// Whether the thread has a turn in flight.
    pub fn is_processing(&self, key: &ThreadKey) -> bool {
        self.records
            .get(key)
            .map(|r| r.turn.is_active())
            .unwrap_or(false)
    }

    /// Whether the thread is waiting on the user (approval or direct input).
    pub fn is_reviewing(&self, key: &ThreadKey) -> bool {
        self.records
            .get(key)
            .map(|r| !r.pending_approvals.is_empty() || !r.pending_inputs.is_empty())
            .unwrap_or(false)
    }

    /// Id of the in-flight turn, if any.
    pub fn active_turn_id(&self, key: &ThreadKey) -> Option<&str> {
        self.records.get(key)?.turn.active_turn_id()
    }

    /// Locally assigned thread name, if the user set one.
    pub fn custom_name(&self, key: &ThreadKey) -> Option<&str> {
        self.records.get(key)?.custom_name.as_deref()
    }

    pub fn is_hidden(&self, key: &ThreadKey) -> bool {
        self.hidden.contains(key)
    }

    pub fn is_archived(&self, key: &ThreadKey) -> bool {
        self.archived.contains(key)
    }

    /// The thread's record, if any event has touched it.
    pub fn record(&self, key: &ThreadKey) -> Option<&ThreadRecord> {
        self.records.get(key)
    }

    /// Transcript items for a thread (empty slice when unknown).
    pub fn items(&self, key: &ThreadKey) -> &[ConversationItem] {
        self.records
            .get(key)
            .map(|r| r.items.as_slice())
            .unwrap_or(&[])
    }

    pub fn pending_approvals(&self, key: &ThreadKey) -> &[ApprovalRequest] {
        self.records
            .get(key)
            .map(|r| r.pending_approvals.as_slice())
            .unwrap_or(&[])
    }

    pub fn pending_inputs(&self, key: &ThreadKey) -> &[PendingUserInputRequest] {
        self.records
            .get(key)
            .map(|r| r.pending_inputs.as_slice())
            .unwrap_or(&[])
    }

    /// Display summaries for every visible thread in a workspace.
    ///
    /// Hidden, archived, and closed threads are excluded; the data stays in
    /// the store.
    pub fn thread_summaries(&self, workspace_id: &str) -> Vec<ThreadSummary> {
        let mut summaries: Vec<ThreadSummary> = self
            .records
            .iter()
            .filter(|(key, _)| key.workspace_id == workspace_id)
            .filter(|(key, _)| {
                !self.hidden.contains(key)
                    && !self.archived.contains(key)
                    && !self.closed.contains(key)
            })
            .map(|(key, record)| ThreadSummary {
                id: key.thread_id.clone(),
                workspace_id: key.workspace_id.clone(),
                name: record.display_name().map(str::to_string),
                is_subagent: record.is_subagent,
                created_at: record.created_at.unwrap_or_else(Utc::now),
                updated_at: record.updated_at.unwrap_or_else(Utc::now),
            })
            .collect();
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        summaries
    }

    /// Parent links for a workspace, as supplied by the backend.
    ///
    /// The map is not guaranteed complete or acyclic; the row view cache is
    /// responsible for resolving it defensively.
    pub fn parent_ids(&self, workspace_id: &str) -> HashMap<String, String> {
        self.records
            .iter()
            .filter(|(key, _)| key.workspace_id == workspace_id)
            .filter_map(|(key, record)| {
                record
                    .parent_thread_id
                    .clone()
                    .map(|parent| (key.thread_id.clone(), parent))
            })
            .collect()
    }

    // -- Internals --------------------------------------------------------

    /// Fetch or lazily create a record; first touch stamps `created_at`.
    pub(crate) fn record_mut(&mut self, key: &ThreadKey) -> &mut ThreadRecord {
        let record = self.records.entry(key.clone()).or_default();
        if record.created_at.is_none() {
            let now = Utc::now();
            record.created_at = Some(now);
            record.updated_at = Some(now);
        }
        record
    }

    /// Bump the thread's `updated_at`.
    pub(crate) fn touch(&mut self, key: &ThreadKey) {
        self.record_mut(key).updated_at = Some(Utc::now());
    }

    fn status_changed(
        &mut self,
        key: ThreadKey,
        name: Option<String>,
        model: Option<String>,
        effort: Option<String>,
        parent_thread_id: Option<String>,
        is_subagent: Option<bool>,
    ) -> Vec<StoreEffect> {
        let record = self.record_mut(&key);
        if name.is_some() {
            record.name = name;
        }
        if model.is_some() {
            record.model = model;
        }
        if effort.is_some() {
            record.effort = effort;
        }
        if parent_thread_id.is_some() {
            record.parent_thread_id = parent_thread_id;
        }
        if let Some(flag) = is_subagent {
            record.is_subagent = flag;
        }
        self.touch(&key);
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> ThreadKey {
        ThreadKey::new("ws-1", "th-1")
    }

    #[test]
    fn test_store_starts_empty() {
        let store = ThreadStore::new();
        assert!(!store.is_processing(&key()));
        assert!(!store.is_reviewing(&key()));
        assert!(store.items(&key()).is_empty());
        assert!(store.thread_summaries("ws-1").is_empty());
    }

    #[test]
    fn test_hide_is_a_visibility_toggle() {
        let mut store = ThreadStore::new();
        store.apply(ThreadAction::TurnStarted {
            key: key(),
            turn_id: "t-1".to_string(),
        });
        assert_eq!(store.thread_summaries("ws-1").len(), 1);

        store.apply(ThreadAction::SetHidden {
            key: key(),
            hidden: true,
        });
        assert!(store.is_hidden(&key()));
        assert!(store.thread_summaries("ws-1").is_empty());
        // Data survives hiding
        assert!(store.record(&key()).is_some());

        store.apply(ThreadAction::SetHidden {
            key: key(),
            hidden: false,
        });
        assert_eq!(store.thread_summaries("ws-1").len(), 1);
    }

    #[test]
    fn test_status_changed_merges_fields() {
        let mut store = ThreadStore::new();
        store.apply(ThreadAction::StatusChanged {
            key: key(),
            name: Some("build fix".to_string()),
            model: Some("gpt-5".to_string()),
            effort: None,
            parent_thread_id: None,
            is_subagent: None,
        });
        store.apply(ThreadAction::StatusChanged {
            key: key(),
            name: None,
            model: None,
            effort: Some("high".to_string()),
            parent_thread_id: None,
            is_subagent: None,
        });

        let record = store.record(&key()).unwrap();
        assert_eq!(record.name.as_deref(), Some("build fix"));
        assert_eq!(record.model.as_deref(), Some("gpt-5"));
        assert_eq!(record.effort.as_deref(), Some("high"));
    }

    #[test]
    fn test_rename_thread_sets_custom_name() {
        let mut store = ThreadStore::new();
        store.apply(ThreadAction::StatusChanged {
            key: key(),
            name: Some("server".to_string()),
            model: None,
            effort: None,
            parent_thread_id: None,
            is_subagent: None,
        });
        store.apply(ThreadAction::RenameThread {
            key: key(),
            name: Some("mine".to_string()),
        });
        assert_eq!(store.custom_name(&key()), Some("mine"));
        assert_eq!(
            store.thread_summaries("ws-1")[0].name.as_deref(),
            Some("mine")
        );
    }

    #[test]
    fn test_archive_toggle_from_events() {
        let mut store = ThreadStore::new();
        store.apply(ThreadAction::TurnStarted {
            key: key(),
            turn_id: "t-1".to_string(),
        });
        store.apply(ThreadAction::Archived { key: key() });
        assert!(store.is_archived(&key()));
        assert!(store.thread_summaries("ws-1").is_empty());

        store.apply(ThreadAction::Unarchived { key: key() });
        assert!(!store.is_archived(&key()));
        assert_eq!(store.thread_summaries("ws-1").len(), 1);
    }
}
