//! Derived, memoized row view of the thread hierarchy.
//!
//! Turns the flat thread list plus the externally supplied parent map into
//! ordered, depth-annotated rows split into pinned and unpinned sections.
//! The result is cached against a snapshot of its inputs; only the single
//! most recent computation is retained, so a cache hit returns the same
//! allocation (reference-stable for the renderer) and anything else
//! recomputes from scratch.
//!
//! The parent map is not trusted: missing parents, self-references, and
//! cycles all degrade to "no resolvable parent" instead of looping.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::models::ThreadSummary;

/// Callback resolving a thread's pin timestamp, if the thread is pinned.
pub type PinLookup<'a> = &'a dyn Fn(&str, &str) -> Option<DateTime<Utc>>;

/// Sort key for root threads and sibling groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Most recently updated first
    #[default]
    UpdatedAt,
    /// Most recently created first
    CreatedAt,
}

/// Display options that shape the row set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrganizeOptions {
    /// When false, sub-agent threads are removed from the rows entirely
    pub show_subagent_sessions: bool,
    /// Parents whose descendants are folded away. The parent row itself
    /// stays, and keeps `has_children` so the toggle affordance renders.
    pub collapsed_parent_thread_ids: BTreeSet<String>,
}

/// One renderable row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadRow {
    pub thread: ThreadSummary,
    /// Nesting level; roots are 0
    pub depth: usize,
    /// Whether the thread has any visible children (collapse state does
    /// not change this)
    pub has_children: bool,
}

/// The computed row sections.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowSet {
    /// Pinned roots (with their subtrees), ordered by pin timestamp
    pub pinned: Vec<ThreadRow>,
    /// Everything else, in hierarchy order
    pub unpinned: Vec<ThreadRow>,
}

/// Snapshot of every input the row computation depends on.
///
/// Thread fingerprints include the resolved-from-map parent id, so a parent
/// map change invalidates the cache even when the thread array and version
/// are unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CacheKey {
    fingerprints: Vec<ThreadFingerprint>,
    workspace_id: String,
    sort: SortOrder,
    version: u64,
    options: OrganizeOptions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ThreadFingerprint {
    id: String,
    parent_id: Option<String>,
    is_subagent: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Memoizing derivation layer over the thread list.
///
/// Holds at most one entry: requesting inputs that differ in any component
/// (including a previously seen `version`) recomputes in full.
#[derive(Debug, Default)]
pub struct RowViewCache {
    entry: Option<(CacheKey, RowSet)>,
}

impl RowViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute (or reuse) the row set for the given inputs.
    ///
    /// On a cache hit the previously computed `RowSet` is returned as-is
    /// and `pin_lookup` is not called.
    #[allow(clippy::too_many_arguments)]
    pub fn rows(
        &mut self,
        threads: &[ThreadSummary],
        sort: SortOrder,
        workspace_id: &str,
        parent_ids: &HashMap<String, String>,
        pin_lookup: PinLookup<'_>,
        version: u64,
        options: &OrganizeOptions,
    ) -> &RowSet {
        let key = CacheKey {
            fingerprints: threads
                .iter()
                .map(|t| ThreadFingerprint {
                    id: t.id.clone(),
                    parent_id: parent_ids.get(&t.id).cloned(),
                    is_subagent: t.is_subagent,
                    created_at: t.created_at,
                    updated_at: t.updated_at,
                })
                .collect(),
            workspace_id: workspace_id.to_string(),
            sort,
            version,
            options: options.clone(),
        };

        let hit = matches!(&self.entry, Some((cached, _)) if *cached == key);
        if !hit {
            trace!(workspace = workspace_id, version, "recomputing thread rows");
            let rows = organize_rows(threads, sort, workspace_id, parent_ids, pin_lookup, options);
            self.entry = Some((key, rows));
        }

        &self.entry.as_ref().unwrap().1
    }

    /// Drop the cached entry (e.g. on workspace switch).
    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

/// Full recomputation: partition, sort, nest, filter, split by pin.
fn organize_rows(
    threads: &[ThreadSummary],
    sort: SortOrder,
    workspace_id: &str,
    parent_ids: &HashMap<String, String>,
    pin_lookup: PinLookup<'_>,
    options: &OrganizeOptions,
) -> RowSet {
    let known: HashSet<&str> = threads.iter().map(|t| t.id.as_str()).collect();

    // Resolve each thread's parent defensively; anything that cannot be
    // followed to a known, acyclic parent counts as unresolved.
    let mut resolved_parent: HashMap<&str, Option<&str>> = HashMap::new();
    for thread in threads {
        resolved_parent.insert(
            thread.id.as_str(),
            resolve_parent(thread.id.as_str(), parent_ids, &known),
        );
    }

    let mut roots: Vec<&ThreadSummary> = Vec::new();
    let mut children_of: HashMap<&str, Vec<&ThreadSummary>> = HashMap::new();
    for thread in threads {
        match resolved_parent[thread.id.as_str()] {
            Some(parent) => {
                if options.show_subagent_sessions || !thread.is_subagent {
                    children_of.entry(parent).or_default().push(thread);
                }
            }
            None => {
                // A sub-agent whose parent never resolved (missing, unknown,
                // or cyclic) is hidden, not promoted to a root.
                if thread.is_subagent {
                    continue;
                }
                roots.push(thread);
            }
        }
    }

    sort_group(&mut roots, sort);
    for group in children_of.values_mut() {
        sort_group(group, sort);
    }

    // Emit one subtree per root, then split by pin state. Only roots are
    // eligible to be pinned; a pinned root carries its subtree with it.
    let mut pinned: Vec<(DateTime<Utc>, Vec<ThreadRow>)> = Vec::new();
    let mut unpinned: Vec<ThreadRow> = Vec::new();
    for root in roots {
        let mut subtree = Vec::new();
        emit_subtree(root, 0, &children_of, options, &mut subtree);

        match pin_lookup(workspace_id, &root.id) {
            Some(pinned_at) => pinned.push((pinned_at, subtree)),
            None => unpinned.extend(subtree),
        }
    }

    pinned.sort_by_key(|(pinned_at, _)| *pinned_at);
    RowSet {
        pinned: pinned.into_iter().flat_map(|(_, rows)| rows).collect(),
        unpinned,
    }
}

/// Follow the parent chain one hop, guarding against unknown ids,
/// self-references, and cycles. A detected cycle means "no resolvable
/// parent" for the starting thread.
fn resolve_parent<'a>(
    id: &str,
    parent_ids: &'a HashMap<String, String>,
    known: &HashSet<&str>,
) -> Option<&'a str> {
    let parent = parent_ids.get(id)?.as_str();
    if !known.contains(parent) || parent == id {
        return None;
    }

    // Walk upward; revisiting any id on the path is a cycle.
    let mut visited: HashSet<&str> = HashSet::from([id]);
    let mut current = parent;
    loop {
        if !visited.insert(current) {
            return None;
        }
        match parent_ids.get(current) {
            Some(next) if known.contains(next.as_str()) => current = next.as_str(),
            _ => return Some(parent),
        }
    }
}

fn sort_group(group: &mut [&ThreadSummary], sort: SortOrder) {
    match sort {
        SortOrder::UpdatedAt => group.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
        SortOrder::CreatedAt => group.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
}

fn emit_subtree(
    thread: &ThreadSummary,
    depth: usize,
    children_of: &HashMap<&str, Vec<&ThreadSummary>>,
    options: &OrganizeOptions,
    out: &mut Vec<ThreadRow>,
) {
    let children = children_of
        .get(thread.id.as_str())
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    out.push(ThreadRow {
        thread: thread.clone(),
        depth,
        has_children: !children.is_empty(),
    });

    if options.collapsed_parent_thread_ids.contains(&thread.id) {
        return;
    }
    for child in children {
        emit_subtree(child, depth + 1, children_of, options, out);
    }
}
