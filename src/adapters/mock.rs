//! Test doubles for the backend traits.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{BackendError, BackendResult};
use crate::events::ServerEvent;
use crate::models::{ApprovalDecision, PredictionModel, ThreadKey};
use crate::traits::{EventSource, ThreadBackend};

/// One recorded backend call, for assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    ResolveApproval {
        key: ThreadKey,
        approval_id: String,
        decision: ApprovalDecision,
    },
    AnswerInput {
        key: ThreadKey,
        input_id: String,
        answer: String,
    },
    PostUserMessage {
        key: ThreadKey,
        text: String,
    },
    InterruptTurn {
        key: ThreadKey,
    },
    PredictResponse {
        workspace_id: String,
        context: String,
        model_id: Option<String>,
    },
    ListModels {
        workspace_id: String,
    },
}

/// Backend double with scripted prediction responses and call recording.
#[derive(Debug, Default)]
pub struct MockBackend {
    calls: Mutex<Vec<RecordedCall>>,
    predict_responses: Mutex<VecDeque<BackendResult<String>>>,
    models: Mutex<Vec<PredictionModel>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next `predict_response` result.
    pub fn push_prediction(&self, result: BackendResult<String>) {
        self.predict_responses.lock().unwrap().push_back(result);
    }

    pub fn set_models(&self, models: Vec<PredictionModel>) {
        *self.models.lock().unwrap() = models;
    }

    /// Everything recorded so far, in call order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: RecordedCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ThreadBackend for MockBackend {
    async fn resolve_approval(
        &self,
        key: &ThreadKey,
        approval_id: &str,
        decision: ApprovalDecision,
    ) -> BackendResult<()> {
        self.record(RecordedCall::ResolveApproval {
            key: key.clone(),
            approval_id: approval_id.to_string(),
            decision,
        });
        Ok(())
    }

    async fn answer_input(
        &self,
        key: &ThreadKey,
        input_id: &str,
        answer: &str,
    ) -> BackendResult<()> {
        self.record(RecordedCall::AnswerInput {
            key: key.clone(),
            input_id: input_id.to_string(),
            answer: answer.to_string(),
        });
        Ok(())
    }

    async fn post_user_message(&self, key: &ThreadKey, text: &str) -> BackendResult<()> {
        self.record(RecordedCall::PostUserMessage {
            key: key.clone(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn interrupt_turn(&self, key: &ThreadKey) -> BackendResult<()> {
        self.record(RecordedCall::InterruptTurn { key: key.clone() });
        Ok(())
    }

    async fn predict_response(
        &self,
        workspace_id: &str,
        context: &str,
        model_id: Option<&str>,
    ) -> BackendResult<String> {
        self.record(RecordedCall::PredictResponse {
            workspace_id: workspace_id.to_string(),
            context: context.to_string(),
            model_id: model_id.map(str::to_string),
        });
        self.predict_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::Connection("no scripted response".to_string())))
    }

    async fn list_models(&self, workspace_id: &str) -> BackendResult<Vec<PredictionModel>> {
        self.record(RecordedCall::ListModels {
            workspace_id: workspace_id.to_string(),
        });
        Ok(self.models.lock().unwrap().clone())
    }
}

/// Event source double fed from a fixed queue.
#[derive(Debug, Default)]
pub struct MockEventSource {
    events: VecDeque<BackendResult<ServerEvent>>,
}

impl MockEventSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: ServerEvent) {
        self.events.push_back(Ok(event));
    }

    pub fn push_error(&mut self, error: BackendError) {
        self.events.push_back(Err(error));
    }
}

#[async_trait]
impl EventSource for MockEventSource {
    async fn next_event(&mut self) -> BackendResult<Option<ServerEvent>> {
        match self.events.pop_front() {
            Some(Ok(event)) => Ok(Some(event)),
            Some(Err(error)) => Err(error),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_backend_records_calls() {
        let backend = MockBackend::new();
        let key = ThreadKey::new("ws-1", "th-1");
        backend
            .resolve_approval(&key, "a-1", ApprovalDecision::Approved)
            .await
            .unwrap();
        backend.interrupt_turn(&key).await.unwrap();

        let calls = backend.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[0],
            RecordedCall::ResolveApproval {
                key: key.clone(),
                approval_id: "a-1".to_string(),
                decision: ApprovalDecision::Approved,
            }
        );
    }

    #[tokio::test]
    async fn test_scripted_predictions_pop_in_order() {
        let backend = MockBackend::new();
        backend.push_prediction(Ok("first".to_string()));
        backend.push_prediction(Ok("second".to_string()));

        assert_eq!(
            backend.predict_response("ws-1", "ctx", None).await.unwrap(),
            "first"
        );
        assert_eq!(
            backend.predict_response("ws-1", "ctx", None).await.unwrap(),
            "second"
        );
        assert!(backend.predict_response("ws-1", "ctx", None).await.is_err());
    }

    #[tokio::test]
    async fn test_mock_event_source_ends_cleanly() {
        let mut source = MockEventSource::new();
        source.push(ServerEvent::parse(
            "turn_started",
            r#"{"workspace_id": "ws", "thread_id": "th", "turn_id": "t"}"#,
        ));

        assert!(source.next_event().await.unwrap().is_some());
        assert!(source.next_event().await.unwrap().is_none());
    }
}
