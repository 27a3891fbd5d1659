//! Application state and logic for the TUI.
//!
//! This module contains the core [`App`] struct and related types:
//! - [`Screen`] - Which screen is currently displayed
//! - [`Focus`] - Which UI component has focus
//! - [`AppMessage`] - Messages for async communication
//!
//! All server-driven mutation flows through [`App::handle_message`]; key
//! handling and the fire-and-forget backend calls live in their own
//! submodules.

mod dispatch;
mod handlers;
mod messages;
mod types;

pub use messages::AppMessage;
pub use types::{Focus, Screen};

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::{Config, ConfigManager};
use crate::models::ThreadKey;
use crate::prediction::PredictionController;
use crate::router::EventRouter;
use crate::rows::{OrganizeOptions, RowSet, RowViewCache};
use crate::store::ThreadStore;
use crate::traits::ThreadBackend;

/// Main application state
pub struct App {
    /// Reconciled per-thread state, fed exclusively by routed events
    pub store: ThreadStore,
    /// Routes raw server events into store actions
    pub router: EventRouter,
    /// Memoized dashboard row computation
    pub row_cache: RowViewCache,
    /// Speculative response suggestion state machine
    pub prediction: PredictionController,
    /// Model catalog for prediction model selection
    pub models: Vec<crate::models::PredictionModel>,
    /// Persisted settings, including pin timestamps
    pub config: Config,
    /// Where to save config changes; `None` in tests
    config_manager: Option<ConfigManager>,
    /// Bumped on every pin change so the row cache sees it
    pub pin_version: u64,
    /// Parent thread IDs whose subtrees are collapsed on the dashboard
    pub collapsed: BTreeSet<String>,
    /// Workspace whose threads the dashboard shows
    pub workspace_id: String,
    /// Current screen being displayed
    pub screen: Screen,
    /// Current focus on the conversation screen
    pub focus: Focus,
    /// Thread open on the conversation screen
    pub active_thread: Option<ThreadKey>,
    /// Selected row index on the dashboard
    pub dashboard_index: usize,
    /// Composer draft text
    pub draft: String,
    /// Flag to track if the app should quit
    pub should_quit: bool,
    /// Transient status text shown in the footer
    pub status_line: Option<String>,
    /// Guards against double interrupt requests
    interrupt_in_progress: bool,
    /// Backend client (shared across async tasks)
    pub backend: Arc<dyn ThreadBackend>,
    /// Receiver for async messages (taken by the run loop)
    pub message_rx: Option<mpsc::UnboundedReceiver<AppMessage>>,
    /// Sender for async messages (clone this to pass to async tasks)
    pub message_tx: mpsc::UnboundedSender<AppMessage>,
    /// Dirty flag: when true, the UI needs to be redrawn
    pub needs_redraw: bool,
}

impl App {
    /// Create a new App instance
    pub fn new(
        backend: Arc<dyn ThreadBackend>,
        config: Config,
        config_manager: Option<ConfigManager>,
        workspace_id: impl Into<String>,
    ) -> Self {
        let (message_tx, message_rx) = mpsc::unbounded_channel();
        let prediction = PredictionController::new(config.predictions_enabled);

        Self {
            store: ThreadStore::new(),
            router: EventRouter::new(),
            row_cache: RowViewCache::new(),
            prediction,
            models: Vec::new(),
            config,
            config_manager,
            pin_version: 0,
            collapsed: BTreeSet::new(),
            workspace_id: workspace_id.into(),
            screen: Screen::default(),
            focus: Focus::default(),
            active_thread: None,
            dashboard_index: 0,
            draft: String::new(),
            should_quit: false,
            status_line: None,
            interrupt_in_progress: false,
            backend,
            message_rx: Some(message_rx),
            message_tx,
            needs_redraw: true,
        }
    }

    /// Mark the UI as needing a redraw
    pub fn mark_dirty(&mut self) {
        self.needs_redraw = true;
    }

    /// The dashboard rows for the current workspace.
    ///
    /// Cached: an unchanged input snapshot returns the previous allocation.
    pub fn visible_rows(&mut self) -> &RowSet {
        let threads = self.store.thread_summaries(&self.workspace_id);
        let parent_ids: HashMap<String, String> = self.store.parent_ids(&self.workspace_id);
        let options = OrganizeOptions {
            show_subagent_sessions: self.config.show_subagent_sessions,
            collapsed_parent_thread_ids: self.collapsed.clone(),
        };
        let config = &self.config;
        self.row_cache.rows(
            &threads,
            self.config.sort_order,
            &self.workspace_id,
            &parent_ids,
            &|ws, th| config.pinned_at(ws, th),
            self.pin_version,
            &options,
        )
    }

    /// The thread key under the dashboard cursor, if any.
    pub fn selected_thread(&mut self) -> Option<ThreadKey> {
        let workspace_id = self.workspace_id.clone();
        let index = self.dashboard_index;
        let rows = self.visible_rows();
        let total = rows.pinned.len() + rows.unpinned.len();
        if total == 0 {
            return None;
        }
        let index = index.min(total - 1);
        let row = if index < rows.pinned.len() {
            &rows.pinned[index]
        } else {
            &rows.unpinned[index - rows.pinned.len()]
        };
        Some(ThreadKey::new(workspace_id, row.thread.id.clone()))
    }

    /// Open a thread on the conversation screen and rescope prediction to it.
    pub fn open_thread(&mut self, key: ThreadKey) {
        self.prediction.set_scope(Some(key.clone()));
        self.active_thread = Some(key);
        self.screen = Screen::Conversation;
        self.focus = Focus::Composer;
        self.draft.clear();
        self.interrupt_in_progress = false;
        self.mark_dirty();
    }

    /// Return to the dashboard, dropping the prediction scope.
    pub fn close_thread(&mut self) {
        self.prediction.set_scope(None);
        self.active_thread = None;
        self.screen = Screen::Dashboard;
        self.draft.clear();
        self.interrupt_in_progress = false;
        self.mark_dirty();
    }

    /// Toggle the pin on a thread and persist the change.
    pub fn toggle_pin(&mut self, key: &ThreadKey) {
        self.config.toggle_pin(&key.workspace_id, &key.thread_id);
        self.pin_version += 1;
        self.save_config();
        self.mark_dirty();
    }

    /// Hide a thread from the dashboard. The store keeps its data; only
    /// visibility changes.
    pub fn hide_thread(&mut self, key: &ThreadKey) {
        self.store.apply(crate::store::ThreadAction::SetHidden {
            key: key.clone(),
            hidden: true,
        });
        self.mark_dirty();
    }

    /// Archive a thread locally. The backend's own archived/unarchived
    /// events replay harmlessly against this.
    pub fn archive_thread(&mut self, key: &ThreadKey) {
        self.store
            .apply(crate::store::ThreadAction::Archived { key: key.clone() });
        self.mark_dirty();
    }

    /// Toggle whether a parent's subtree is collapsed on the dashboard.
    pub fn toggle_collapse(&mut self, thread_id: &str) {
        if !self.collapsed.remove(thread_id) {
            self.collapsed.insert(thread_id.to_string());
        }
        self.mark_dirty();
    }

    /// Toggle subagent thread visibility and persist the change.
    pub fn toggle_subagent_visibility(&mut self) {
        self.config.show_subagent_sessions = !self.config.show_subagent_sessions;
        self.save_config();
        self.mark_dirty();
    }

    /// Toggle the speculative response feature and persist the change.
    pub fn toggle_predictions(&mut self) {
        self.config.predictions_enabled = !self.config.predictions_enabled;
        self.prediction.set_enabled(self.config.predictions_enabled);
        self.save_config();
        self.mark_dirty();
    }

    fn save_config(&self) {
        if let Some(manager) = &self.config_manager {
            if !manager.save(&self.config) {
                tracing::warn!(path = %manager.config_path().display(), "failed to save config");
            }
        }
    }

    pub(crate) fn set_interrupt_in_progress(&mut self, value: bool) {
        self.interrupt_in_progress = value;
    }

    pub(crate) fn interrupt_in_progress(&self) -> bool {
        self.interrupt_in_progress
    }
}
