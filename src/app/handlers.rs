//! Message and key handling for the App.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::warn;

use super::{App, AppMessage, Screen};
use crate::models::ApprovalDecision;

impl App {
    /// Handle an incoming async message.
    ///
    /// All message handlers mark the app as dirty since they update visible
    /// state.
    pub fn handle_message(&mut self, msg: AppMessage) {
        self.mark_dirty();
        match msg {
            AppMessage::Server(event) => self.handle_server_event(event),
            AppMessage::StreamClosed { reason } => {
                warn!(?reason, "event stream closed");
                self.status_line = Some(match reason {
                    Some(reason) => format!("event stream closed: {reason}"),
                    None => "event stream closed".to_string(),
                });
            }
            AppMessage::PredictionResolved { generation, result } => {
                self.prediction.resolve(generation, result);
            }
            AppMessage::ModelsLoaded(models) => {
                self.models = models;
            }
            AppMessage::BackendCallFailed { context, error } => {
                warn!(%context, %error, "backend call failed");
                self.status_line = Some(format!("{context} failed: {error}"));
            }
        }
    }

    /// Route one server event through the store, then react to what it
    /// changed on the active thread.
    fn handle_server_event(&mut self, event: crate::events::ServerEvent) {
        let active = self.active_thread.clone();
        let was_processing = active.as_ref().map(|key| self.store.is_processing(key));

        let effects = self.router.dispatch(event, &mut self.store);
        for effect in effects {
            self.acknowledge_effect(effect);
        }

        let Some(key) = active else {
            return;
        };
        let now_processing = self.store.is_processing(&key);

        // A fresh turn invalidates any pending or visible suggestion.
        if was_processing == Some(false) && now_processing {
            self.prediction.note_turn_started();
        }
        // Turn is over, whatever was in flight; allow a new interrupt.
        if !now_processing {
            self.set_interrupt_in_progress(false);
        }

        let request = self.prediction.observe(
            now_processing,
            self.draft.is_empty(),
            self.store.items(&key),
            &self.models,
        );
        if let Some(request) = request {
            self.send_prediction(request);
        }
    }

    /// Handle a key event for the current screen.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match self.screen {
            Screen::Dashboard => self.handle_dashboard_key(key),
            Screen::Conversation => self.handle_conversation_key(key),
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.dashboard_index = self.dashboard_index.saturating_sub(1);
                self.mark_dirty();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let rows = self.visible_rows();
                let total = rows.pinned.len() + rows.unpinned.len();
                if total > 0 {
                    self.dashboard_index = (self.dashboard_index + 1).min(total - 1);
                }
                self.mark_dirty();
            }
            KeyCode::Enter => {
                if let Some(selected) = self.selected_thread() {
                    self.open_thread(selected);
                }
            }
            KeyCode::Char('p') => {
                if let Some(selected) = self.selected_thread() {
                    self.toggle_pin(&selected);
                }
            }
            KeyCode::Char('c') => {
                if let Some(selected) = self.selected_thread() {
                    self.toggle_collapse(&selected.thread_id);
                }
            }
            KeyCode::Char('h') => {
                if let Some(selected) = self.selected_thread() {
                    self.hide_thread(&selected);
                }
            }
            KeyCode::Char('a') => {
                if let Some(selected) = self.selected_thread() {
                    self.archive_thread(&selected);
                }
            }
            KeyCode::Char('s') => {
                self.toggle_subagent_visibility();
            }
            KeyCode::Char('t') => {
                self.toggle_predictions();
            }
            _ => {}
        }
    }

    fn handle_conversation_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => self.interrupt_active_turn(),
                KeyCode::Char('y') => self.resolve_pending_approval(ApprovalDecision::Approved),
                KeyCode::Char('a') => {
                    self.resolve_pending_approval(ApprovalDecision::ApprovedAlways)
                }
                KeyCode::Char('n') => self.resolve_pending_approval(ApprovalDecision::Denied),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Esc => {
                // First Esc clears a suggestion, second leaves the thread.
                if self.prediction.ghost_text(self.draft.is_empty()).is_some() {
                    self.prediction.dismiss();
                    self.mark_dirty();
                } else {
                    self.close_thread();
                }
            }
            KeyCode::Tab => {
                if let Some(text) = self.prediction.accept() {
                    self.draft = text;
                    self.mark_dirty();
                }
            }
            KeyCode::Enter => {
                let answering = self
                    .active_thread
                    .as_ref()
                    .map(|key| !self.store.pending_inputs(key).is_empty())
                    .unwrap_or(false);
                if answering {
                    // While an input request is pending, the draft answers it
                    // instead of posting a message.
                    let answer = self.draft.trim().to_string();
                    if !answer.is_empty() {
                        self.draft.clear();
                        self.prediction.note_draft_changed();
                        self.answer_pending_input(answer);
                    }
                } else {
                    self.submit_draft();
                }
            }
            KeyCode::Backspace => {
                if self.draft.pop().is_some() {
                    self.prediction.note_draft_changed();
                    self.mark_dirty();
                }
            }
            KeyCode::Char(c) => {
                self.draft.push(c);
                self.prediction.note_draft_changed();
                self.mark_dirty();
            }
            _ => {}
        }
    }
}
