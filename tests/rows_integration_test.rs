//! Row view cache behavior through the public API: hierarchy shape,
//! pin/collapse/subagent filters, and memoization.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, TimeZone, Utc};
use weft::models::ThreadSummary;
use weft::rows::{OrganizeOptions, RowViewCache, SortOrder};

fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 1, 12, minute, 0).unwrap()
}

fn thread(id: &str, minute: u32, is_subagent: bool) -> ThreadSummary {
    ThreadSummary {
        id: id.to_string(),
        workspace_id: "ws-1".to_string(),
        name: Some(format!("thread {id}")),
        is_subagent,
        created_at: at(minute),
        updated_at: at(minute),
    }
}

fn no_pins(_: &str, _: &str) -> Option<DateTime<Utc>> {
    None
}

#[test]
fn test_subagent_children_hidden_by_default() {
    let threads = vec![
        thread("root", 10, false),
        thread("child", 11, true),
        thread("grandchild", 12, true),
    ];
    let parents: HashMap<String, String> = [
        ("child".to_string(), "root".to_string()),
        ("grandchild".to_string(), "child".to_string()),
    ]
    .into();

    let mut cache = RowViewCache::new();
    let rows = cache.rows(
        &threads,
        SortOrder::UpdatedAt,
        "ws-1",
        &parents,
        &no_pins,
        0,
        &OrganizeOptions::default(),
    );
    assert_eq!(rows.unpinned.len(), 1);
    assert_eq!(rows.unpinned[0].thread.id, "root");
    assert!(!rows.unpinned[0].has_children);

    let rows = cache.rows(
        &threads,
        SortOrder::UpdatedAt,
        "ws-1",
        &parents,
        &no_pins,
        0,
        &OrganizeOptions {
            show_subagent_sessions: true,
            collapsed_parent_thread_ids: BTreeSet::new(),
        },
    );
    let ids: Vec<&str> = rows.unpinned.iter().map(|r| r.thread.id.as_str()).collect();
    assert_eq!(ids, ["root", "child", "grandchild"]);
    let depths: Vec<usize> = rows.unpinned.iter().map(|r| r.depth).collect();
    assert_eq!(depths, [0, 1, 2]);
    assert!(rows.unpinned[0].has_children);
}

#[test]
fn test_collapse_prunes_subtree_but_keeps_marker() {
    let threads = vec![
        thread("a", 10, false),
        thread("a1", 11, false),
        thread("b", 12, false),
    ];
    let parents: HashMap<String, String> = [("a1".to_string(), "a".to_string())].into();

    let mut cache = RowViewCache::new();
    let mut collapsed = BTreeSet::new();
    collapsed.insert("a".to_string());
    let rows = cache.rows(
        &threads,
        SortOrder::UpdatedAt,
        "ws-1",
        &parents,
        &no_pins,
        0,
        &OrganizeOptions {
            show_subagent_sessions: false,
            collapsed_parent_thread_ids: collapsed,
        },
    );

    let ids: Vec<&str> = rows.unpinned.iter().map(|r| r.thread.id.as_str()).collect();
    assert_eq!(ids, ["b", "a"]);
    let a = rows.unpinned.iter().find(|r| r.thread.id == "a").unwrap();
    assert!(a.has_children);
}

#[test]
fn test_parent_cycle_degrades_to_roots() {
    let threads = vec![thread("x", 10, false), thread("y", 11, false)];
    let parents: HashMap<String, String> = [
        ("x".to_string(), "y".to_string()),
        ("y".to_string(), "x".to_string()),
    ]
    .into();

    let mut cache = RowViewCache::new();
    let rows = cache.rows(
        &threads,
        SortOrder::UpdatedAt,
        "ws-1",
        &parents,
        &no_pins,
        0,
        &OrganizeOptions::default(),
    );
    // Both land at the root level instead of looping.
    assert_eq!(rows.unpinned.len(), 2);
    assert!(rows.unpinned.iter().all(|r| r.depth == 0));
}

#[test]
fn test_pinned_section_orders_by_pin_time() {
    let threads = vec![
        thread("a", 10, false),
        thread("b", 11, false),
        thread("c", 12, false),
    ];
    let parents = HashMap::new();
    let pins = |_: &str, th: &str| -> Option<DateTime<Utc>> {
        match th {
            "a" => Some(at(30)),
            "c" => Some(at(20)),
            _ => None,
        }
    };

    let mut cache = RowViewCache::new();
    let rows = cache.rows(
        &threads,
        SortOrder::UpdatedAt,
        "ws-1",
        &parents,
        &pins,
        1,
        &OrganizeOptions::default(),
    );

    // Oldest pin first.
    let pinned: Vec<&str> = rows.pinned.iter().map(|r| r.thread.id.as_str()).collect();
    assert_eq!(pinned, ["c", "a"]);
    let unpinned: Vec<&str> = rows.unpinned.iter().map(|r| r.thread.id.as_str()).collect();
    assert_eq!(unpinned, ["b"]);
}

#[test]
fn test_unchanged_inputs_reuse_cached_rows() {
    let threads = vec![thread("a", 10, false), thread("b", 11, false)];
    let parents = HashMap::new();
    let mut cache = RowViewCache::new();

    let first = cache
        .rows(
            &threads,
            SortOrder::UpdatedAt,
            "ws-1",
            &parents,
            &no_pins,
            0,
            &OrganizeOptions::default(),
        )
        .clone();
    let second = cache.rows(
        &threads,
        SortOrder::UpdatedAt,
        "ws-1",
        &parents,
        &no_pins,
        0,
        &OrganizeOptions::default(),
    );
    assert_eq!(*second, first);

    // A version bump invalidates even with identical threads.
    let third = cache.rows(
        &threads,
        SortOrder::UpdatedAt,
        "ws-1",
        &parents,
        &no_pins,
        1,
        &OrganizeOptions::default(),
    );
    assert_eq!(*third, first);
}

#[test]
fn test_sort_order_changes_root_order() {
    let mut a = thread("a", 10, false);
    a.created_at = at(40); // created last, updated first is b
    let b = thread("b", 30, false);
    let threads = vec![a, b];
    let parents = HashMap::new();
    let mut cache = RowViewCache::new();

    let rows = cache.rows(
        &threads,
        SortOrder::UpdatedAt,
        "ws-1",
        &parents,
        &no_pins,
        0,
        &OrganizeOptions::default(),
    );
    assert_eq!(rows.unpinned[0].thread.id, "b");

    let rows = cache.rows(
        &threads,
        SortOrder::CreatedAt,
        "ws-1",
        &parents,
        &no_pins,
        0,
        &OrganizeOptions::default(),
    );
    assert_eq!(rows.unpinned[0].thread.id, "a");
}
