//! Tool, resolver and task re-fetch endpoints over HTTP.

use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::domain::errors::{BackendError, BackendResult};
use crate::domain::models::{Args, EntityKind, ResolutionContext, ResolutionMatch};
use crate::domain::ports::{EntityLookup, TaskQuery, TaskRecord, ToolInvoker};

use super::backend::{query_pairs, BackendHttp};

/// One client implementing every backend port except chat.
#[derive(Debug, Clone)]
pub struct HttpToolClient {
    backend: BackendHttp,
}

#[derive(Debug, Serialize)]
struct ResolveIdRequest<'a> {
    entity: EntityKind,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a ResolutionContext>,
}

#[derive(Debug, Serialize)]
struct ResolveUserRequest<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a ResolutionContext>,
}

#[derive(Debug, Deserialize)]
struct ResolveResponse {
    #[serde(default)]
    best: Option<ResolutionMatch>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TaskEnvelope {
    Wrapped { task: TaskRecord },
    Bare(TaskRecord),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TaskList {
    Bare(Vec<TaskRecord>),
    Subtasks { subtasks: Vec<TaskRecord> },
    Tasks { tasks: Vec<TaskRecord> },
}

impl TaskList {
    fn into_records(self) -> Vec<TaskRecord> {
        match self {
            Self::Bare(records) | Self::Subtasks { subtasks: records } | Self::Tasks { tasks: records } => {
                records
            }
        }
    }
}

impl HttpToolClient {
    pub const fn new(backend: BackendHttp) -> Self {
        Self { backend }
    }

    async fn get_list(&self, path: &str, query: &[(&str, &str)]) -> BackendResult<Vec<TaskRecord>> {
        let response = self
            .backend
            .send(self.backend.request(Method::GET, path).query(query))
            .await?;
        let list: TaskList = self.backend.json(response).await?;
        Ok(list.into_records())
    }
}

#[async_trait]
impl ToolInvoker for HttpToolClient {
    #[instrument(skip(self, args))]
    async fn read(&self, endpoint: &str, args: &Args) -> BackendResult<Value> {
        let request = self
            .backend
            .request(Method::GET, &format!("tools/{endpoint}"))
            .query(&query_pairs(args));
        let response = self.backend.send(request).await?;
        self.backend.json(response).await
    }

    #[instrument(skip(self, args))]
    async fn write(&self, endpoint: &str, args: &Args) -> BackendResult<Value> {
        let request = self
            .backend
            .request(Method::POST, &format!("tools/{endpoint}"))
            .json(args);
        let response = self.backend.send(request).await?;
        self.backend.json(response).await
    }
}

#[async_trait]
impl EntityLookup for HttpToolClient {
    #[instrument(skip(self, context))]
    async fn lookup(
        &self,
        entity: EntityKind,
        name: &str,
        context: &ResolutionContext,
    ) -> BackendResult<Option<ResolutionMatch>> {
        let context = (!context.is_empty()).then_some(context);
        let request = match entity {
            EntityKind::User => self
                .backend
                .request(Method::POST, "tools/resolve-user")
                .json(&ResolveUserRequest { name, context }),
            EntityKind::Project | EntityKind::Task => self
                .backend
                .request(Method::POST, "tools/resolve-id")
                .json(&ResolveIdRequest {
                    entity,
                    name,
                    context,
                }),
        };
        let response = self.backend.send(request).await?;
        let resolved: ResolveResponse = self.backend.json(response).await?;
        debug!(found = resolved.best.is_some(), "lookup answered");
        Ok(resolved.best)
    }
}

#[async_trait]
impl TaskQuery for HttpToolClient {
    async fn task_by_id(&self, task_id: &str) -> BackendResult<Option<TaskRecord>> {
        let request = self.backend.request(Method::GET, &format!("tasks/{task_id}"));
        match self.backend.send(request).await {
            Ok(response) => {
                let envelope: TaskEnvelope = self.backend.json(response).await?;
                Ok(Some(match envelope {
                    TaskEnvelope::Wrapped { task } | TaskEnvelope::Bare(task) => task,
                }))
            }
            Err(BackendError::Status { status: 404, .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn subtasks_of(&self, parent_task_id: &str) -> BackendResult<Vec<TaskRecord>> {
        self.get_list(&format!("tasks/{parent_task_id}/subtasks"), &[])
            .await
    }

    async fn search_by_title(
        &self,
        title: &str,
        project_id: Option<&str>,
    ) -> BackendResult<Vec<TaskRecord>> {
        let mut query = vec![("title", title)];
        if let Some(project_id) = project_id {
            query.push(("projectId", project_id));
        }
        self.get_list("tasks", &query).await
    }
}
