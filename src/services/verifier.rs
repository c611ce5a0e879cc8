//! Post-execution verification of writer directives.
//!
//! A 2xx from a write endpoint is not trusted on its own for task and
//! subtask creation: the verifier re-reads domain state through the
//! [`TaskQuery`] port before the executor may advance. Other writers are
//! accepted on HTTP success alone. Verification only reads.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::domain::errors::{OrchestratorError, OrchestratorResult};
use crate::domain::models::{arg_str, Args, Tool, VerificationKind};
use crate::domain::ports::TaskQuery;

/// Successful verification result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// The claimed record was found. For `create-task` this carries the id of
    /// the task that now exists.
    Verified { created_task_id: Option<String> },
    /// No independent re-check exists for this writer.
    NotChecked,
}

pub struct PostExecutionVerifier {
    queries: Arc<dyn TaskQuery>,
    /// Conversation project, used when a writer names none.
    project_id: Option<String>,
}

impl PostExecutionVerifier {
    pub fn new(queries: Arc<dyn TaskQuery>) -> Self {
        Self {
            queries,
            project_id: None,
        }
    }

    pub fn set_project(&mut self, project_id: Option<String>) {
        self.project_id = project_id;
    }

    /// Confirm that `tool`, invoked with `args`, produced the effect its
    /// `response` claims.
    #[instrument(skip_all, fields(tool = %tool))]
    pub async fn verify(
        &self,
        tool: &Tool,
        args: &Args,
        response: &Value,
    ) -> OrchestratorResult<Verification> {
        match tool.verification() {
            VerificationKind::CreatedTask => self.verify_created_task(args, response).await,
            VerificationKind::Subtask => self.verify_subtask(tool, args, response).await,
            VerificationKind::None => Ok(Verification::NotChecked),
        }
    }

    async fn verify_created_task(
        &self,
        args: &Args,
        response: &Value,
    ) -> OrchestratorResult<Verification> {
        if let Some(id) = created_task_id(response) {
            match self.queries.task_by_id(&id).await {
                Ok(Some(task)) => {
                    debug!(task_id = %task.id, "created task re-fetched");
                    return Ok(Verification::Verified {
                        created_task_id: Some(task.id),
                    });
                }
                Ok(None) => debug!(task_id = %id, "created task not found by id"),
                Err(err) => warn!(task_id = %id, error = %err, "task re-fetch failed"),
            }
        }

        let title = arg_str(args, "title").ok_or_else(|| {
            OrchestratorError::Verification("created task has no id or title to look up".to_string())
        })?;
        let project_id = arg_str(args, "projectId").or(self.project_id.as_deref());
        let candidates = self
            .queries
            .search_by_title(title, project_id)
            .await
            .map_err(|err| OrchestratorError::Verification(err.message()))?;

        candidates
            .into_iter()
            .find(|task| task.title_matches(title) && task.in_project(project_id))
            .map(|task| Verification::Verified {
                created_task_id: Some(task.id),
            })
            .ok_or_else(|| {
                OrchestratorError::Verification(format!("task \"{title}\" could not be found"))
            })
    }

    async fn verify_subtask(
        &self,
        tool: &Tool,
        args: &Args,
        response: &Value,
    ) -> OrchestratorResult<Verification> {
        let Some(title) = arg_str(args, "title") else {
            if matches!(tool, Tool::UpdateSubtask) {
                return Ok(Verification::NotChecked);
            }
            return Err(OrchestratorError::Verification(
                "subtask has no title to look up".to_string(),
            ));
        };

        let parent_id = arg_str(args, "taskId")
            .map(str::to_string)
            .or_else(|| parent_task_id(response))
            .ok_or_else(|| {
                OrchestratorError::Verification(format!(
                    "parent task of subtask \"{title}\" is unknown"
                ))
            })?;

        let subtasks = self
            .queries
            .subtasks_of(&parent_id)
            .await
            .map_err(|err| OrchestratorError::Verification(err.message()))?;

        if subtasks.iter().any(|s| s.title_matches(title)) {
            Ok(Verification::Verified {
                created_task_id: None,
            })
        } else {
            Err(OrchestratorError::Verification(format!(
                "subtask \"{title}\" not found under task {parent_id}"
            )))
        }
    }
}

/// Id of the task a `create-task` response reports, from `task.id` or `id`.
pub fn created_task_id(response: &Value) -> Option<String> {
    response
        .pointer("/task/id")
        .or_else(|| response.get("id"))
        .and_then(id_string)
}

fn parent_task_id(response: &Value) -> Option<String> {
    ["/taskId", "/parentTaskId", "/subtask/taskId", "/subtask/parentTaskId"]
        .iter()
        .find_map(|pointer| response.pointer(pointer).and_then(id_string))
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
