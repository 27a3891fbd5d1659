//! HTTP backend adapter using reqwest.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::error::{BackendError, BackendResult};
use crate::models::{ApprovalDecision, PredictionModel, ThreadKey};
use crate::traits::ThreadBackend;

/// Production backend client.
#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct PredictResponseBody {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ModelListBody {
    #[serde(default)]
    models: Vec<PredictionModel>,
}

impl ReqwestBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn thread_url(&self, key: &ThreadKey, suffix: &str) -> String {
        format!(
            "{}/v1/workspaces/{}/threads/{}/{}",
            self.base_url, key.workspace_id, key.thread_id, suffix
        )
    }

    async fn check(response: reqwest::Response) -> BackendResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(BackendError::Server {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ThreadBackend for ReqwestBackend {
    async fn resolve_approval(
        &self,
        key: &ThreadKey,
        approval_id: &str,
        decision: ApprovalDecision,
    ) -> BackendResult<()> {
        let url = self.thread_url(key, &format!("approvals/{approval_id}"));
        let response = self
            .client
            .post(url)
            .json(&json!({ "decision": decision }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn answer_input(
        &self,
        key: &ThreadKey,
        input_id: &str,
        answer: &str,
    ) -> BackendResult<()> {
        let url = self.thread_url(key, &format!("inputs/{input_id}"));
        let response = self
            .client
            .post(url)
            .json(&json!({ "answer": answer }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn post_user_message(&self, key: &ThreadKey, text: &str) -> BackendResult<()> {
        let url = self.thread_url(key, "messages");
        let response = self
            .client
            .post(url)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn interrupt_turn(&self, key: &ThreadKey) -> BackendResult<()> {
        let url = self.thread_url(key, "interrupt");
        let response = self.client.post(url).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn predict_response(
        &self,
        workspace_id: &str,
        context: &str,
        model_id: Option<&str>,
    ) -> BackendResult<String> {
        let url = format!("{}/v1/predict", self.base_url);
        let response = self
            .client
            .post(url)
            .json(&json!({
                "workspace_id": workspace_id,
                "context": context,
                "model_id": model_id,
            }))
            .send()
            .await?;
        let body: PredictResponseBody = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(body.text)
    }

    async fn list_models(&self, workspace_id: &str) -> BackendResult<Vec<PredictionModel>> {
        let url = format!("{}/v1/workspaces/{}/models", self.base_url, workspace_id);
        let response = self.client.get(url).send().await?;
        let body: ModelListBody = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(body.models)
    }
}
