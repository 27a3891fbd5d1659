//! Turn lifecycle reductions.
//!
//! The gating rules here are the store's primary defense against
//! out-of-order delivery: a completion or error is only honored when its
//! turn id matches the thread's currently active turn.

use tracing::{debug, warn};

use crate::models::{ConversationItem, ThreadKey, TurnStatus};
use crate::store::{StoreEffect, ThreadStore};

impl ThreadStore {
    /// A turn began. A different active turn on the thread is implicitly
    /// superseded and its stale pending-interrupt marker cleared; a
    /// redelivered start for the already-active turn changes nothing, so an
    /// interrupt requested in between stays pending.
    pub(crate) fn turn_started(&mut self, key: ThreadKey, turn_id: String) -> Vec<StoreEffect> {
        let record = self.record_mut(&key);
        if record.turn.active_turn_id() == Some(turn_id.as_str()) {
            return Vec::new();
        }
        if let Some(previous) = record.turn.active_turn_id() {
            debug!(thread = %key, superseded = previous, new = %turn_id, "turn superseded");
        }
        record.turn = TurnStatus::Active { turn_id };
        record.pending_interrupt = false;
        self.touch(&key);
        Vec::new()
    }

    /// A turn finished. Ignored unless the id matches the active turn; a
    /// match with the pending-interrupt marker set is recorded as an
    /// interruption rather than a normal completion.
    pub(crate) fn turn_completed(&mut self, key: ThreadKey, turn_id: String) -> Vec<StoreEffect> {
        let record = self.record_mut(&key);
        if record.turn.active_turn_id() != Some(turn_id.as_str()) {
            debug!(thread = %key, turn = %turn_id, "stale turn completion ignored");
            return Vec::new();
        }

        record.turn = if record.pending_interrupt {
            record.pending_interrupt = false;
            TurnStatus::Interrupted
        } else {
            TurnStatus::Completed
        };
        self.touch(&key);
        Vec::new()
    }

    /// A turn failed. Gated like completion; the failure surfaces as a
    /// transcript error item, never as an exception.
    pub(crate) fn turn_error(
        &mut self,
        key: ThreadKey,
        turn_id: String,
        message: String,
    ) -> Vec<StoreEffect> {
        let record = self.record_mut(&key);
        if record.turn.active_turn_id() != Some(turn_id.as_str()) {
            debug!(thread = %key, turn = %turn_id, "stale turn error ignored");
            return Vec::new();
        }

        warn!(thread = %key, turn = %turn_id, %message, "turn failed");
        record.turn = TurnStatus::Error;
        record.pending_interrupt = false;
        let item = ConversationItem::error(message);
        record.items.push(item);
        self.touch(&key);
        Vec::new()
    }

    /// The user asked for the active turn to be stopped. No-op when no turn
    /// is in flight.
    pub(crate) fn interrupt_requested(&mut self, key: ThreadKey) -> Vec<StoreEffect> {
        let record = self.record_mut(&key);
        if record.turn.is_active() {
            record.pending_interrupt = true;
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::models::{ItemContent, ThreadKey, TurnStatus};
    use crate::store::{ThreadAction, ThreadStore};

    fn key() -> ThreadKey {
        ThreadKey::new("ws-1", "th-1")
    }

    fn start_turn(store: &mut ThreadStore, turn_id: &str) {
        store.apply(ThreadAction::TurnStarted {
            key: key(),
            turn_id: turn_id.to_string(),
        });
    }

    #[test]
    fn test_completion_for_active_turn() {
        let mut store = ThreadStore::new();
        start_turn(&mut store, "t-1");
        assert!(store.is_processing(&key()));
        assert_eq!(store.active_turn_id(&key()), Some("t-1"));

        store.apply(ThreadAction::TurnCompleted {
            key: key(),
            turn_id: "t-1".to_string(),
        });
        assert!(!store.is_processing(&key()));
        assert_eq!(store.record(&key()).unwrap().turn, TurnStatus::Completed);
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let mut store = ThreadStore::new();
        start_turn(&mut store, "t-1");
        start_turn(&mut store, "t-2");

        // Completion for the superseded turn must not end t-2.
        store.apply(ThreadAction::TurnCompleted {
            key: key(),
            turn_id: "t-1".to_string(),
        });
        assert!(store.is_processing(&key()));
        assert_eq!(store.active_turn_id(&key()), Some("t-2"));
    }

    #[test]
    fn test_completion_replay_is_harmless() {
        let mut store = ThreadStore::new();
        start_turn(&mut store, "t-1");
        let done = ThreadAction::TurnCompleted {
            key: key(),
            turn_id: "t-1".to_string(),
        };
        store.apply(done.clone());
        store.apply(done);
        assert_eq!(store.record(&key()).unwrap().turn, TurnStatus::Completed);
    }

    #[test]
    fn test_interrupt_marks_completion_as_interrupted() {
        let mut store = ThreadStore::new();
        start_turn(&mut store, "t-1");
        store.apply(ThreadAction::InterruptRequested { key: key() });
        assert!(store.record(&key()).unwrap().pending_interrupt);

        store.apply(ThreadAction::TurnCompleted {
            key: key(),
            turn_id: "t-1".to_string(),
        });
        let record = store.record(&key()).unwrap();
        assert_eq!(record.turn, TurnStatus::Interrupted);
        assert!(!record.pending_interrupt);
    }

    #[test]
    fn test_interrupt_without_active_turn_is_noop() {
        let mut store = ThreadStore::new();
        store.apply(ThreadAction::InterruptRequested { key: key() });
        assert!(!store.record(&key()).unwrap().pending_interrupt);
    }

    #[test]
    fn test_redelivered_turn_start_keeps_pending_interrupt() {
        let mut store = ThreadStore::new();
        start_turn(&mut store, "t-1");
        store.apply(ThreadAction::InterruptRequested { key: key() });
        // Redelivery of the same start must not clear the marker.
        start_turn(&mut store, "t-1");
        assert!(store.record(&key()).unwrap().pending_interrupt);

        store.apply(ThreadAction::TurnCompleted {
            key: key(),
            turn_id: "t-1".to_string(),
        });
        assert_eq!(store.record(&key()).unwrap().turn, TurnStatus::Interrupted);
    }

    #[test]
    fn test_new_turn_clears_stale_interrupt_marker() {
        let mut store = ThreadStore::new();
        start_turn(&mut store, "t-1");
        store.apply(ThreadAction::InterruptRequested { key: key() });
        start_turn(&mut store, "t-2");

        let record = store.record(&key()).unwrap();
        assert!(!record.pending_interrupt);
        assert_eq!(record.turn.active_turn_id(), Some("t-2"));
    }

    #[test]
    fn test_turn_error_appends_transcript_item() {
        let mut store = ThreadStore::new();
        start_turn(&mut store, "t-1");
        store.apply(ThreadAction::TurnError {
            key: key(),
            turn_id: "t-1".to_string(),
            message: "model overloaded".to_string(),
        });

        let record = store.record(&key()).unwrap();
        assert_eq!(record.turn, TurnStatus::Error);
        assert_eq!(record.items.len(), 1);
        match &record.items[0].content {
            ItemContent::Error { message } => assert_eq!(message, "model overloaded"),
            other => panic!("expected error item, got {other:?}"),
        }

        // Store stays usable after an error event.
        store.apply(ThreadAction::TurnStarted {
            key: key(),
            turn_id: "t-2".to_string(),
        });
        assert!(store.is_processing(&key()));
    }

    #[test]
    fn test_stale_turn_error_is_ignored() {
        let mut store = ThreadStore::new();
        start_turn(&mut store, "t-2");
        store.apply(ThreadAction::TurnError {
            key: key(),
            turn_id: "t-1".to_string(),
            message: "late failure".to_string(),
        });

        let record = store.record(&key()).unwrap();
        assert!(record.turn.is_active());
        assert!(record.items.is_empty());
    }
}
