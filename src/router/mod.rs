//! Event routing: one time-ordered stream in, store actions out.
//!
//! The router classifies each server event into one of four handler
//! families (turn lifecycle, item/streaming content, approval, user input)
//! and translates it into a store action. It holds no thread state of its
//! own; its only side effects are logging and the diagnostics buffer for
//! events it cannot place.
//!
//! Events are dispatched strictly in arrival order. The store's gating
//! logic depends on causal order, so no batching or reordering happens
//! here.

mod diagnostics;

use tracing::debug;

use crate::events::{EventKind, ServerEvent};
use crate::models::ThreadKey;
use crate::store::{StoreEffect, ThreadAction, ThreadStore};

pub use diagnostics::{DiagnosticEntry, DiagnosticsLog};

/// Stateless dispatcher from server events to store actions.
#[derive(Debug, Default)]
pub struct EventRouter {
    diagnostics: DiagnosticsLog,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route one event into the store, returning any effects the store
    /// asked for. Unroutable events are recorded and dropped; this never
    /// fails.
    pub fn dispatch(&mut self, event: ServerEvent, store: &mut ThreadStore) -> Vec<StoreEffect> {
        let ServerEvent { meta, kind } = event;

        if let EventKind::Unrouted { method, payload } = kind {
            debug!(method = %method, "unrouted event recorded");
            self.diagnostics.record(method, payload);
            return Vec::new();
        }

        let Some(key) = meta.key() else {
            // Attribution is mandatory for every routable family; without
            // it there is no thread to apply the event to.
            debug!(method = kind.method_name(), "event without attribution recorded");
            self.diagnostics
                .record(kind.method_name().to_string(), format!("{kind:?}"));
            return Vec::new();
        };

        match Self::classify(key, kind) {
            Some(action) => store.apply(action),
            None => Vec::new(),
        }
    }

    /// Unrouted diagnostics recorded so far.
    pub fn diagnostics(&self) -> &DiagnosticsLog {
        &self.diagnostics
    }

    /// Map a routable event to its store action. Exhaustive by handler
    /// family; a new `EventKind` variant fails compilation here until it is
    /// placed.
    fn classify(key: ThreadKey, kind: EventKind) -> Option<ThreadAction> {
        Some(match kind {
            // -- Turn lifecycle family ------------------------------------
            EventKind::TurnStarted { turn_id } => ThreadAction::TurnStarted { key, turn_id },
            EventKind::TurnCompleted { turn_id } => ThreadAction::TurnCompleted { key, turn_id },
            EventKind::TurnError { turn_id, message } => ThreadAction::TurnError {
                key,
                turn_id,
                message,
            },
            EventKind::ThreadStatusChanged {
                name,
                model,
                effort,
                parent_thread_id,
                is_subagent,
            } => ThreadAction::StatusChanged {
                key,
                name,
                model,
                effort,
                parent_thread_id,
                is_subagent,
            },
            EventKind::ThreadArchived => ThreadAction::Archived { key },
            EventKind::ThreadUnarchived => ThreadAction::Unarchived { key },
            EventKind::ThreadClosed => ThreadAction::Closed { key },
            EventKind::PlanUpdated { text } => ThreadAction::PlanUpdated { key, text },
            EventKind::DiffUpdated { text } => ThreadAction::DiffUpdated { key, text },
            EventKind::TokenUsageUpdated { usage } => {
                ThreadAction::TokenUsageUpdated { key, usage }
            }
            EventKind::RateLimitsUpdated { limits } => {
                ThreadAction::RateLimitsUpdated { key, limits }
            }

            // -- Item / streaming family ----------------------------------
            EventKind::ItemStarted { item } => ThreadAction::ItemStarted { key, item },
            EventKind::ItemCompleted { item_id } => ThreadAction::ItemCompleted { key, item_id },
            EventKind::MessageDelta { item_id, delta } => ThreadAction::MessageDelta {
                key,
                item_id,
                delta,
            },
            EventKind::MessageCompleted { item_id } => {
                ThreadAction::ItemCompleted { key, item_id }
            }
            EventKind::ReasoningDelta { item_id, delta } => ThreadAction::ReasoningDelta {
                key,
                item_id,
                delta,
            },
            EventKind::ReasoningBoundary { item_id } => {
                ThreadAction::ReasoningBoundary { key, item_id }
            }
            EventKind::PlanDelta { item_id, delta } => ThreadAction::PlanDelta {
                key,
                item_id,
                delta,
            },
            EventKind::CommandOutputDelta { item_id, delta } => {
                ThreadAction::CommandOutputDelta {
                    key,
                    item_id,
                    delta,
                }
            }
            EventKind::TerminalInteraction { item_id, data } => {
                ThreadAction::TerminalInteraction { key, item_id, data }
            }
            EventKind::FileChangeOutputDelta { item_id, delta } => {
                ThreadAction::FileChangeOutputDelta {
                    key,
                    item_id,
                    delta,
                }
            }

            // -- Approval family ------------------------------------------
            EventKind::ApprovalRequested { request } => {
                ThreadAction::ApprovalRequested { key, request }
            }

            // -- User input family ----------------------------------------
            EventKind::InputRequested { request } => {
                ThreadAction::InputRequested { key, request }
            }

            // Handled before classify; nothing to apply.
            EventKind::Unrouted { .. } => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ServerEvent;
    use crate::models::TurnStatus;

    fn dispatch(router: &mut EventRouter, store: &mut ThreadStore, method: &str, data: &str) {
        router.dispatch(ServerEvent::parse(method, data), store);
    }

    #[test]
    fn test_turn_lifecycle_round_trip() {
        let mut router = EventRouter::new();
        let mut store = ThreadStore::new();
        let key = ThreadKey::new("ws-1", "th-1");

        dispatch(
            &mut router,
            &mut store,
            "turn_started",
            r#"{"workspace_id": "ws-1", "thread_id": "th-1", "turn_id": "t-1"}"#,
        );
        assert!(store.is_processing(&key));

        dispatch(
            &mut router,
            &mut store,
            "turn_completed",
            r#"{"workspace_id": "ws-1", "thread_id": "th-1", "turn_id": "t-1"}"#,
        );
        assert_eq!(store.record(&key).unwrap().turn, TurnStatus::Completed);
        assert!(router.diagnostics().is_empty());
    }

    #[test]
    fn test_interleaved_threads_stay_isolated() {
        let mut router = EventRouter::new();
        let mut store = ThreadStore::new();

        dispatch(
            &mut router,
            &mut store,
            "turn_started",
            r#"{"workspace_id": "ws-1", "thread_id": "th-a", "turn_id": "t-1"}"#,
        );
        dispatch(
            &mut router,
            &mut store,
            "turn_started",
            r#"{"workspace_id": "ws-2", "thread_id": "th-b", "turn_id": "t-2"}"#,
        );
        dispatch(
            &mut router,
            &mut store,
            "turn_completed",
            r#"{"workspace_id": "ws-2", "thread_id": "th-b", "turn_id": "t-2"}"#,
        );

        assert!(store.is_processing(&ThreadKey::new("ws-1", "th-a")));
        assert!(!store.is_processing(&ThreadKey::new("ws-2", "th-b")));
    }

    #[test]
    fn test_unknown_method_lands_in_diagnostics() {
        let mut router = EventRouter::new();
        let mut store = ThreadStore::new();

        dispatch(
            &mut router,
            &mut store,
            "brand_new_event",
            r#"{"workspace_id": "ws-1", "thread_id": "th-1"}"#,
        );

        assert_eq!(router.diagnostics().len(), 1);
        let entry = router.diagnostics().entries().next().unwrap();
        assert_eq!(entry.method, "brand_new_event");
        // Nothing leaked into the store.
        assert!(store.record(&ThreadKey::new("ws-1", "th-1")).is_none());
    }

    #[test]
    fn test_missing_attribution_lands_in_diagnostics() {
        let mut router = EventRouter::new();
        let mut store = ThreadStore::new();

        dispatch(
            &mut router,
            &mut store,
            "turn_started",
            r#"{"turn_id": "t-1"}"#,
        );

        assert_eq!(router.diagnostics().len(), 1);
        assert!(store.thread_summaries("ws-1").is_empty());
    }

    #[test]
    fn test_streaming_events_route_to_items() {
        let mut router = EventRouter::new();
        let mut store = ThreadStore::new();
        let key = ThreadKey::new("ws-1", "th-1");

        dispatch(
            &mut router,
            &mut store,
            "item_started",
            r#"{"workspace_id": "ws-1", "thread_id": "th-1",
                "item": {"id": "i-1", "kind": "message", "role": "assistant", "text": "",
                         "completed": false, "started_at": "2026-08-29T10:00:00Z"}}"#,
        );
        dispatch(
            &mut router,
            &mut store,
            "message_delta",
            r#"{"workspace_id": "ws-1", "thread_id": "th-1", "item_id": "i-1", "delta": "hi"}"#,
        );
        dispatch(
            &mut router,
            &mut store,
            "message_completed",
            r#"{"workspace_id": "ws-1", "thread_id": "th-1", "item_id": "i-1"}"#,
        );

        let items = store.items(&key);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].content.text(), Some("hi"));
        assert!(items[0].completed);
    }

    #[test]
    fn test_approval_event_routes_to_pending() {
        let mut router = EventRouter::new();
        let mut store = ThreadStore::new();
        let key = ThreadKey::new("ws-1", "th-1");

        dispatch(
            &mut router,
            &mut store,
            "approval_requested",
            r#"{"workspace_id": "ws-1", "thread_id": "th-1",
                "request": {"id": "a-1", "description": "run tests",
                            "command": ["cargo", "test"], "cwd": "/repo"}}"#,
        );

        assert!(store.is_reviewing(&key));
        assert_eq!(store.pending_approvals(&key)[0].id, "a-1");
    }
}
