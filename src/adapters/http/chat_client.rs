//! Chat-completion endpoint over HTTP.

use async_trait::async_trait;
use reqwest::Method;
use tracing::instrument;

use crate::domain::errors::BackendResult;
use crate::domain::ports::{ChatClient, ChatRequest, ChatResponse};

use super::backend::BackendHttp;

#[derive(Debug, Clone)]
pub struct HttpChatClient {
    backend: BackendHttp,
}

impl HttpChatClient {
    pub const fn new(backend: BackendHttp) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ChatClient for HttpChatClient {
    #[instrument(skip_all, fields(history = request.history.len()))]
    async fn complete(&self, request: &ChatRequest) -> BackendResult<ChatResponse> {
        let builder = self.backend.request(Method::POST, "chat").json(request);
        let response = self.backend.send(builder).await?;
        self.backend.json(response).await
    }
}
