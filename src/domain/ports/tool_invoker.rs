use async_trait::async_trait;
use serde_json::Value;

use crate::domain::errors::BackendResult;
use crate::domain::models::Args;

/// Port for the `/tools/{name}` endpoints of the project-management backend.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    /// `GET /tools/{endpoint}` with `args` as query parameters.
    async fn read(&self, endpoint: &str, args: &Args) -> BackendResult<Value>;

    /// `POST /tools/{endpoint}` with `args` as the JSON body.
    async fn write(&self, endpoint: &str, args: &Args) -> BackendResult<Value>;
}
