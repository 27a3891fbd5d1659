//! Fire-and-forget backend calls spawned from user gestures.
//!
//! Each call clones the backend handle and the message sender; failures come
//! back as [`AppMessage::BackendCallFailed`] so the UI can surface them
//! without blocking the event loop.

use tracing::info;

use super::{App, AppMessage};
use crate::models::ApprovalDecision;
use crate::prediction::PredictionRequest;
use crate::store::{StoreEffect, ThreadAction};

impl App {
    /// Resolve the oldest pending approval on the active thread.
    ///
    /// Applies the resolution locally first; the backend call is
    /// fire-and-forget and the server's own `approval_resolved` event is a
    /// no-op replay against the already-updated store.
    pub fn resolve_pending_approval(&mut self, decision: ApprovalDecision) {
        let Some(key) = self.active_thread.clone() else {
            return;
        };
        let Some(request) = self.store.pending_approvals(&key).first().cloned() else {
            return;
        };

        self.store.apply(ThreadAction::ApprovalResolved {
            key: key.clone(),
            approval_id: request.id.clone(),
            decision,
        });
        self.mark_dirty();

        let backend = self.backend.clone();
        let message_tx = self.message_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = backend.resolve_approval(&key, &request.id, decision).await {
                let _ = message_tx.send(AppMessage::BackendCallFailed {
                    context: format!("approval {}", request.id),
                    error: e.to_string(),
                });
            }
        });
    }

    /// Acknowledge an allowlist auto-approval to the backend.
    pub fn acknowledge_effect(&mut self, effect: StoreEffect) {
        match effect {
            StoreEffect::AutoApproved {
                key,
                approval_id,
                rule,
            } => {
                info!(thread = %key, approval = %approval_id, command = ?rule.command,
                    "auto-approved by allow rule");
                let backend = self.backend.clone();
                let message_tx = self.message_tx.clone();
                tokio::spawn(async move {
                    if let Err(e) = backend
                        .resolve_approval(&key, &approval_id, ApprovalDecision::Approved)
                        .await
                    {
                        let _ = message_tx.send(AppMessage::BackendCallFailed {
                            context: format!("auto-approval {approval_id}"),
                            error: e.to_string(),
                        });
                    }
                });
            }
        }
    }

    /// Answer the oldest pending user-input request on the active thread.
    pub fn answer_pending_input(&mut self, answer: String) {
        let Some(key) = self.active_thread.clone() else {
            return;
        };
        let Some(request) = self.store.pending_inputs(&key).first().cloned() else {
            return;
        };

        self.store.apply(ThreadAction::InputAnswered {
            key: key.clone(),
            input_id: request.id.clone(),
        });
        self.mark_dirty();

        let backend = self.backend.clone();
        let message_tx = self.message_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = backend.answer_input(&key, &request.id, &answer).await {
                let _ = message_tx.send(AppMessage::BackendCallFailed {
                    context: format!("input {}", request.id),
                    error: e.to_string(),
                });
            }
        });
    }

    /// Submit the composer draft as a user message.
    pub fn submit_draft(&mut self) {
        let Some(key) = self.active_thread.clone() else {
            return;
        };
        let text = self.draft.trim().to_string();
        if text.is_empty() {
            return;
        }
        self.draft.clear();
        self.prediction.note_draft_changed();
        self.mark_dirty();

        let backend = self.backend.clone();
        let message_tx = self.message_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = backend.post_user_message(&key, &text).await {
                let _ = message_tx.send(AppMessage::BackendCallFailed {
                    context: "send message".to_string(),
                    error: e.to_string(),
                });
            }
        });
    }

    /// Ask the backend to stop the active thread's turn.
    ///
    /// Guards:
    /// - Does nothing if an interrupt is already in flight
    /// - Does nothing if the thread has no active turn
    /// - Does nothing if there's no active thread
    pub fn interrupt_active_turn(&mut self) {
        if self.interrupt_in_progress() {
            return;
        }
        let Some(key) = self.active_thread.clone() else {
            return;
        };
        if !self.store.is_processing(&key) {
            return;
        }

        self.set_interrupt_in_progress(true);
        // Marks the thread so the eventual turn completion reads as
        // interrupted rather than finished.
        self.store.apply(ThreadAction::InterruptRequested { key: key.clone() });
        self.mark_dirty();

        let backend = self.backend.clone();
        let message_tx = self.message_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = backend.interrupt_turn(&key).await {
                let _ = message_tx.send(AppMessage::BackendCallFailed {
                    context: "interrupt".to_string(),
                    error: e.to_string(),
                });
            }
        });
    }

    /// Spawn the backend call for an issued prediction request.
    pub fn send_prediction(&self, request: PredictionRequest) {
        let backend = self.backend.clone();
        let message_tx = self.message_tx.clone();
        tokio::spawn(async move {
            let result = backend
                .predict_response(
                    &request.workspace_id,
                    &request.context,
                    request.model_id.as_deref(),
                )
                .await
                .map_err(|e| e.to_string());
            let _ = message_tx.send(AppMessage::PredictionResolved {
                generation: request.generation,
                result,
            });
        });
    }

    /// Fetch the prediction model catalog in the background.
    pub fn refresh_models(&self) {
        let backend = self.backend.clone();
        let message_tx = self.message_tx.clone();
        let workspace_id = self.workspace_id.clone();
        tokio::spawn(async move {
            match backend.list_models(&workspace_id).await {
                Ok(models) => {
                    let _ = message_tx.send(AppMessage::ModelsLoaded(models));
                }
                Err(e) => {
                    let _ = message_tx.send(AppMessage::BackendCallFailed {
                        context: "list models".to_string(),
                        error: e.to_string(),
                    });
                }
            }
        });
    }
}
