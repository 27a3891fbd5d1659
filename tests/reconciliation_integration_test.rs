//! End-to-end event reconciliation tests.
//!
//! Drives raw wire events through `ServerEvent::parse`, the router, and the
//! store, checking the state a client would actually render.

use weft::events::ServerEvent;
use weft::models::{ApprovalDecision, ItemContent, ThreadKey};
use weft::router::EventRouter;
use weft::store::{StoreEffect, ThreadAction, ThreadStore};

fn dispatch(
    router: &mut EventRouter,
    store: &mut ThreadStore,
    method: &str,
    data: &str,
) -> Vec<StoreEffect> {
    router.dispatch(ServerEvent::parse(method, data), store)
}

#[test]
fn test_streaming_turn_builds_transcript() {
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
        "item_started",
        r#"{"workspace_id": "ws-1", "thread_id": "th-1",
            "item": {"id": "m-1", "kind": "message", "role": "assistant", "text": ""}}"#,
    );
    dispatch(
        &mut router,
        &mut store,
        "message_delta",
        r#"{"workspace_id": "ws-1", "thread_id": "th-1", "item_id": "m-1", "delta": "Hello"}"#,
    );
    dispatch(
        &mut router,
        &mut store,
        "message_delta",
        r#"{"workspace_id": "ws-1", "thread_id": "th-1", "item_id": "m-1", "delta": ", world"}"#,
    );
    dispatch(
        &mut router,
        &mut store,
        "message_completed",
        r#"{"workspace_id": "ws-1", "thread_id": "th-1", "item_id": "m-1"}"#,
    );
    dispatch(
        &mut router,
        &mut store,
        "turn_completed",
        r#"{"workspace_id": "ws-1", "thread_id": "th-1", "turn_id": "t-1"}"#,
    );

    assert!(!store.is_processing(&key));
    let items = store.items(&key);
    assert_eq!(items.len(), 1);
    assert!(items[0].completed);
    assert_eq!(items[0].content.text(), Some("Hello, world"));
}

#[test]
fn test_stale_turn_completion_does_not_clobber_newer_turn() {
    let mut router = EventRouter::new();
    let mut store = ThreadStore::new();
    let key = ThreadKey::new("ws-1", "th-1");

    dispatch(
        &mut router,
        &mut store,
        "turn_started",
        r#"{"workspace_id": "ws-1", "thread_id": "th-1", "turn_id": "t-1"}"#,
    );
    dispatch(
        &mut router,
        &mut store,
        "turn_started",
        r#"{"workspace_id": "ws-1", "thread_id": "th-1", "turn_id": "t-2"}"#,
    );
    // Completion of the superseded turn arrives late.
    dispatch(
        &mut router,
        &mut store,
        "turn_completed",
        r#"{"workspace_id": "ws-1", "thread_id": "th-1", "turn_id": "t-1"}"#,
    );
    assert!(store.is_processing(&key));
    assert_eq!(store.active_turn_id(&key), Some("t-2"));

    dispatch(
        &mut router,
        &mut store,
        "turn_completed",
        r#"{"workspace_id": "ws-1", "thread_id": "th-1", "turn_id": "t-2"}"#,
    );
    assert!(!store.is_processing(&key));
}

#[test]
fn test_turn_error_lands_in_transcript() {
    let mut router = EventRouter::new();
    let mut store = ThreadStore::new();
    let key = ThreadKey::new("ws-1", "th-1");

    dispatch(
        &mut router,
        &mut store,
        "turn_started",
        r#"{"workspace_id": "ws-1", "thread_id": "th-1", "turn_id": "t-1"}"#,
    );
    dispatch(
        &mut router,
        &mut store,
        "turn_error",
        r#"{"workspace_id": "ws-1", "thread_id": "th-1", "turn_id": "t-1",
            "message": "model overloaded"}"#,
    );

    assert!(!store.is_processing(&key));
    let items = store.items(&key);
    assert_eq!(items.len(), 1);
    assert!(matches!(
        &items[0].content,
        ItemContent::Error { message } if message == "model overloaded"
    ));
}

#[test]
fn test_allow_rule_auto_approves_matching_request() {
    let mut router = EventRouter::new();
    let mut store = ThreadStore::new();
    let key = ThreadKey::new("ws-1", "th-1");

    let effects = dispatch(
        &mut router,
        &mut store,
        "approval_requested",
        r#"{"workspace_id": "ws-1", "thread_id": "th-1",
            "request": {"id": "a-1", "description": "run build",
                        "command": ["make", "all"], "cwd": "/src"}}"#,
    );
    assert!(effects.is_empty());
    assert_eq!(store.pending_approvals(&key).len(), 1);

    store.apply(ThreadAction::ApprovalResolved {
        key: key.clone(),
        approval_id: "a-1".to_string(),
        decision: ApprovalDecision::ApprovedAlways,
    });

    let effects = dispatch(
        &mut router,
        &mut store,
        "approval_requested",
        r#"{"workspace_id": "ws-1", "thread_id": "th-1",
            "request": {"id": "a-2", "description": "run build",
                        "command": ["make", "all"], "cwd": "/src"}}"#,
    );
    assert_eq!(effects.len(), 1);
    assert!(matches!(
        &effects[0],
        StoreEffect::AutoApproved { approval_id, .. } if approval_id == "a-2"
    ));
    assert!(store.pending_approvals(&key).is_empty());

    // A different cwd does not match the remembered rule.
    let effects = dispatch(
        &mut router,
        &mut store,
        "approval_requested",
        r#"{"workspace_id": "ws-1", "thread_id": "th-1",
            "request": {"id": "a-3", "description": "run build",
                        "command": ["make", "all"], "cwd": "/other"}}"#,
    );
    assert!(effects.is_empty());
    assert_eq!(store.pending_approvals(&key).len(), 1);
}

#[test]
fn test_unknown_method_and_missing_meta_go_to_diagnostics() {
    let mut router = EventRouter::new();
    let mut store = ThreadStore::new();

    dispatch(
        &mut router,
        &mut store,
        "telemetry_ping",
        r#"{"workspace_id": "ws-1", "thread_id": "th-1", "payload": 42}"#,
    );
    // Known method, but no thread address.
    dispatch(
        &mut router,
        &mut store,
        "turn_started",
        r#"{"turn_id": "t-1"}"#,
    );
    // Garbage payload for a known method.
    dispatch(&mut router, &mut store, "turn_started", "not json at all");

    assert_eq!(router.diagnostics().len(), 3);
    assert!(store.thread_summaries("ws-1").is_empty());
}

#[test]
fn test_interrupted_turn_completes_quietly() {
    let mut router = EventRouter::new();
    let mut store = ThreadStore::new();
    let key = ThreadKey::new("ws-1", "th-1");

    dispatch(
        &mut router,
        &mut store,
        "turn_started",
        r#"{"workspace_id": "ws-1", "thread_id": "th-1", "turn_id": "t-1"}"#,
    );
    store.apply(ThreadAction::InterruptRequested { key: key.clone() });

    dispatch(
        &mut router,
        &mut store,
        "turn_completed",
        r#"{"workspace_id": "ws-1", "thread_id": "th-1", "turn_id": "t-1"}"#,
    );

    // The completion was expected; no error item, marker cleared.
    assert!(!store.is_processing(&key));
    assert!(store.items(&key).is_empty());
    assert!(!store.record(&key).unwrap().pending_interrupt);
}
