use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::BackendResult;
use crate::domain::models::ChatMessage;

/// Request to the chat-completion endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub history: Vec<ChatMessage>,
    /// Steps the operator approved, sent when answering a plan.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_approved_steps: Option<Vec<String>>,
}

/// Response from the chat-completion endpoint.
///
/// Only `response` is inspected; it may embed directive JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Port for the model. The orchestrator treats its output as opaque text.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> BackendResult<ChatResponse>;
}
