//! Backend control-plane trait.

use async_trait::async_trait;

use crate::error::BackendResult;
use crate::models::{ApprovalDecision, PredictionModel, ThreadKey};

/// Request/response calls the client makes against the backend.
///
/// All calls are fallible with no delivery guarantee beyond eventual
/// resolution or rejection; callers own retry and staleness handling.
#[async_trait]
pub trait ThreadBackend: Send + Sync {
    /// Answer a pending approval request.
    async fn resolve_approval(
        &self,
        key: &ThreadKey,
        approval_id: &str,
        decision: ApprovalDecision,
    ) -> BackendResult<()>;

    /// Answer a pending user-input request.
    async fn answer_input(&self, key: &ThreadKey, input_id: &str, answer: &str)
        -> BackendResult<()>;

    /// Submit a user message. The resulting transcript item arrives back
    /// through the event stream, not through this call.
    async fn post_user_message(&self, key: &ThreadKey, text: &str) -> BackendResult<()>;

    /// Ask the backend to stop the thread's active turn.
    async fn interrupt_turn(&self, key: &ThreadKey) -> BackendResult<()>;

    /// Best-effort suggestion for the user's next message.
    ///
    /// No timeout is applied here; staleness is handled by the caller's
    /// generation counter.
    async fn predict_response(
        &self,
        workspace_id: &str,
        context: &str,
        model_id: Option<&str>,
    ) -> BackendResult<String>;

    /// The model catalog used for prediction model selection.
    async fn list_models(&self, workspace_id: &str) -> BackendResult<Vec<PredictionModel>>;
}
