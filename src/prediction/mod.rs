//! Speculative next-response suggestions ("ghost text").
//!
//! When the current thread's turn finishes, the controller may issue a
//! best-effort backend call for a suggested next user message. The hard part
//! is staleness: the call is asynchronous and the state that justified it
//! can be gone by the time it resolves. Every issued request carries the
//! controller's generation counter, every state-mutating transition bumps
//! the counter first, and a resolving request commits only if its counter
//! still matches. Cancellation is cooperative; a stale call still runs to
//! completion but can never become visible.

mod context;

use tracing::debug;

use crate::models::{ConversationItem, PredictionModel, ThreadKey};

pub use context::{build_context, select_model};

/// The literal a backend returns to mean "no suggestion".
const NO_SUGGESTION_SENTINEL: &str = "NONE";

/// Lifecycle of the current suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PredictionState {
    /// Nothing in flight and nothing to show
    #[default]
    Idle,
    /// A request was issued and has not resolved (or been invalidated)
    Loading,
    /// A suggestion is available as ghost text
    Ready(String),
    /// The user consumed or dismissed the suggestion
    Dismissed,
}

/// A request the caller should run against the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionRequest {
    /// Generation tag compared at commit time
    pub generation: u64,
    pub workspace_id: String,
    /// Rendered transcript tail
    pub context: String,
    /// Model to ask for, when the catalog offered a suitable one
    pub model_id: Option<String>,
}

/// Owner of prediction state for exactly one thread at a time.
#[derive(Debug, Default)]
pub struct PredictionController {
    state: PredictionState,
    /// Monotonic counter; in-flight results commit only on exact match
    generation: u64,
    /// Feature toggle; disabling forces `Idle` and invalidates
    enabled: bool,
    /// The (workspace, thread) the state belongs to
    scope: Option<ThreadKey>,
    /// Last observed processing flag for the current scope; an edge needs
    /// a prior `true`
    last_processing: Option<bool>,
}

impl PredictionController {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Default::default()
        }
    }

    pub fn state(&self) -> &PredictionState {
        &self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable the feature. Disabling invalidates anything in
    /// flight and clears visible state.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled && !enabled {
            self.invalidate();
            self.state = PredictionState::Idle;
        }
        self.enabled = enabled;
    }

    /// Point the controller at a different thread (or none).
    ///
    /// Resets to `Idle` and forgets the previous processing flag, so a
    /// true-to-false edge straddling the switch can never fire.
    pub fn set_scope(&mut self, scope: Option<ThreadKey>) {
        if self.scope == scope {
            return;
        }
        self.invalidate();
        self.scope = scope;
        self.state = PredictionState::Idle;
        self.last_processing = None;
    }

    pub fn scope(&self) -> Option<&ThreadKey> {
        self.scope.as_ref()
    }

    /// The composer draft changed. Any in-flight or visible suggestion is
    /// invalidated immediately.
    pub fn note_draft_changed(&mut self) {
        self.invalidate();
        if matches!(
            self.state,
            PredictionState::Loading | PredictionState::Ready(_)
        ) {
            self.state = PredictionState::Idle;
        }
    }

    /// A new turn started on the current thread while a suggestion was
    /// pending or visible; force back to `Idle`.
    pub fn note_turn_started(&mut self) {
        self.invalidate();
        self.state = PredictionState::Idle;
    }

    /// Observe the current thread's processing flag and maybe issue a
    /// request.
    ///
    /// Fires only on the `true -> false` edge, and only when every gate
    /// holds: feature enabled, empty draft, a non-empty transcript whose
    /// most recent item is not a user message, and a non-empty rendered
    /// context.
    pub fn observe(
        &mut self,
        is_processing: bool,
        draft_empty: bool,
        items: &[ConversationItem],
        models: &[PredictionModel],
    ) -> Option<PredictionRequest> {
        let edge = self.last_processing == Some(true) && !is_processing;
        self.last_processing = Some(is_processing);
        if !edge {
            return None;
        }

        let workspace_id = self.scope.as_ref()?.workspace_id.clone();
        if !self.enabled || !draft_empty {
            return None;
        }
        let last_item = items.last()?;
        if last_item.is_user_message() {
            return None;
        }
        let context = build_context(items)?;

        self.generation += 1;
        self.state = PredictionState::Loading;
        debug!(workspace = %workspace_id, generation = self.generation, "prediction issued");
        Some(PredictionRequest {
            generation: self.generation,
            workspace_id,
            context,
            model_id: select_model(models),
        })
    }

    /// Commit a resolved request, unless it went stale.
    ///
    /// An empty or sentinel ("NONE") suggestion counts as no suggestion.
    /// Failures land back in `Idle`; this feature never surfaces errors.
    pub fn resolve(&mut self, generation: u64, result: Result<String, String>) {
        if generation != self.generation {
            debug!(generation, current = self.generation, "stale prediction discarded");
            return;
        }
        if self.state != PredictionState::Loading {
            return;
        }

        match result {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() || text.eq_ignore_ascii_case(NO_SUGGESTION_SENTINEL) {
                    self.state = PredictionState::Idle;
                } else {
                    self.state = PredictionState::Ready(text.to_string());
                }
            }
            Err(error) => {
                debug!(%error, "prediction call failed");
                self.state = PredictionState::Idle;
            }
        }
    }

    /// Ghost text to render, if any. Only a `Ready` suggestion over a still
    /// empty draft is ever exposed.
    pub fn ghost_text(&self, draft_empty: bool) -> Option<&str> {
        match &self.state {
            PredictionState::Ready(text) if draft_empty => Some(text),
            _ => None,
        }
    }

    /// Consume the ready suggestion, if any.
    pub fn accept(&mut self) -> Option<String> {
        match std::mem::take(&mut self.state) {
            PredictionState::Ready(text) => {
                self.invalidate();
                self.state = PredictionState::Dismissed;
                Some(text)
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Drop a loading or ready suggestion without consuming it.
    pub fn dismiss(&mut self) {
        if matches!(
            self.state,
            PredictionState::Loading | PredictionState::Ready(_)
        ) {
            self.invalidate();
            self.state = PredictionState::Dismissed;
        }
    }

    /// Revoke the commit rights of anything in flight.
    fn invalidate(&mut self) {
        self.generation += 1;
    }
}
