//! Step queue executor.
//!
//! Drives the directives of one model turn strictly in order, one in flight
//! at a time: classify, then either read and append the result, or gate,
//! invoke and verify a writer. Any failure drains the rest of the queue and
//! is reported in the transcript.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::domain::errors::{OrchestratorError, OrchestratorResult};
use crate::domain::models::{
    arg_str, looks_like_id, Args, CrossStepContext, Decision, Directive, PendingConfirmation,
    ResolutionContext, StepQueue, Tool, Transcript,
};
use crate::domain::ports::{Operator, ToolInvoker};

use super::confirmation_gate::ConfirmationGate;
use super::verifier::{PostExecutionVerifier, Verification};

/// Outcome of running one queue.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TurnReport {
    /// Directives that ran to completion (readers included).
    pub completed: usize,
    /// Why the queue stopped early, if it did.
    pub aborted: Option<OrchestratorError>,
    /// Directives drained without running.
    pub discarded: usize,
}

impl TurnReport {
    pub const fn is_success(&self) -> bool {
        self.aborted.is_none()
    }
}

pub struct StepExecutor {
    tools: Arc<dyn ToolInvoker>,
    gate: ConfirmationGate,
    verifier: PostExecutionVerifier,
    queue: StepQueue,
    context: CrossStepContext,
    ambient: ResolutionContext,
}

impl StepExecutor {
    pub fn new(
        tools: Arc<dyn ToolInvoker>,
        gate: ConfirmationGate,
        verifier: PostExecutionVerifier,
    ) -> Self {
        Self {
            tools,
            gate,
            verifier,
            queue: StepQueue::new(),
            context: CrossStepContext::default(),
            ambient: ResolutionContext::default(),
        }
    }

    /// Project/workspace the conversation is scoped to. The project is merged
    /// into readers that omit one, scopes name lookups and bounds the title
    /// search that verifies a created task.
    pub fn set_ambient(&mut self, ambient: ResolutionContext) {
        self.gate.set_ambient(ambient.clone());
        self.verifier.set_project(ambient.project_id.clone());
        self.ambient = ambient;
    }

    pub const fn context(&self) -> &CrossStepContext {
        &self.context
    }

    pub const fn pending(&self) -> Option<&PendingConfirmation> {
        self.gate.pending()
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Tear down all per-turn state.
    pub fn reset(&mut self) {
        self.queue.drain();
        self.context.reset();
        self.gate.reset();
    }

    /// Run `directives` as a fresh queue.
    ///
    /// Per-turn state is reset first, so nothing carries over from an
    /// earlier turn. Each writer suspends on `operator` until it decides.
    #[instrument(skip_all, fields(directives = directives.len()))]
    pub async fn run(
        &mut self,
        directives: Vec<Directive>,
        operator: &dyn Operator,
        transcript: &mut Transcript,
    ) -> TurnReport {
        self.reset();
        self.queue.load(directives);

        let mut report = TurnReport::default();
        while let Some(directive) = self.queue.pop() {
            match self.execute(directive, operator, transcript).await {
                Ok(()) => report.completed += 1,
                Err(err) => {
                    report.discarded = self.queue.drain();
                    warn!(
                        error = %err,
                        completed = report.completed,
                        discarded = report.discarded,
                        "step queue aborted"
                    );
                    transcript.push_assistant(err.transcript_text());
                    report.aborted = Some(err);
                    break;
                }
            }
        }
        report
    }

    async fn execute(
        &mut self,
        directive: Directive,
        operator: &dyn Operator,
        transcript: &mut Transcript,
    ) -> OrchestratorResult<()> {
        let tool = Tool::from_raw(&directive.tool);
        info!(tool = %tool, access = %tool.access(), "executing directive");
        if tool.is_reader() {
            self.run_reader(&tool, directive.args, transcript).await
        } else {
            self.run_writer(tool, directive, operator, transcript).await
        }
    }

    async fn run_reader(
        &self,
        tool: &Tool,
        mut args: Args,
        transcript: &mut Transcript,
    ) -> OrchestratorResult<()> {
        if !args.contains_key("projectId") {
            if let Some(project_id) = &self.ambient.project_id {
                args.insert("projectId".to_string(), Value::String(project_id.clone()));
            }
        }
        let result = self.tools.read(tool.endpoint(), &args).await?;
        let pretty = serde_json::to_string_pretty(&result).unwrap_or_else(|_| result.to_string());
        transcript.push_assistant(pretty);
        Ok(())
    }

    async fn run_writer(
        &mut self,
        tool: Tool,
        directive: Directive,
        operator: &dyn Operator,
        transcript: &mut Transcript,
    ) -> OrchestratorResult<()> {
        let (directive, pinned) = self.inherit_parent_task(&tool, directive);

        let pending = self.gate.open(tool, directive, pinned).await?;
        match operator.review(pending).await {
            Decision::Accept => {}
            Decision::Reject => {
                self.gate.reject()?;
                return Err(OrchestratorError::Rejected);
            }
        }

        let accepted = self.gate.accept().await?;
        let response = match self.tools.write(accepted.tool.endpoint(), &accepted.args).await {
            Ok(response) => response,
            Err(err) if err.status() == Some(409) && !accepted.tool.is_known_writer() => {
                info!(tool = %accepted.tool, "conflict treated as already done");
                json!({ "message": "Already exists." })
            }
            Err(err) => return Err(err.into()),
        };

        let verification = self
            .verifier
            .verify(&accepted.tool, &accepted.args, &response)
            .await?;
        if accepted.tool == Tool::CreateTask {
            if let Verification::Verified {
                created_task_id: Some(id),
            } = &verification
            {
                self.context.last_created_task_id = Some(id.clone());
            }
        }

        transcript.push_assistant(success_summary(&accepted.tool, &accepted.args, &response));
        Ok(())
    }

    /// Subtask tools whose `taskId` is missing or not an id inherit the task
    /// created earlier in this queue; without one the field is dropped so the
    /// backend resolves the parent from its title.
    fn inherit_parent_task(
        &self,
        tool: &Tool,
        mut directive: Directive,
    ) -> (Directive, &'static [&'static str]) {
        if !tool.is_subtask_family() {
            return (directive, &[]);
        }
        if arg_str(&directive.args, "taskId").is_some_and(looks_like_id) {
            return (directive, &[]);
        }
        match &self.context.last_created_task_id {
            Some(id) => {
                info!(task_id = %id, "subtask inherits task created earlier in this turn");
                directive
                    .args
                    .insert("taskId".to_string(), Value::String(id.clone()));
                (directive, &["taskId"])
            }
            None => {
                directive.args.remove("taskId");
                (directive, &[])
            }
        }
    }
}

/// Assistant message appended after a writer succeeds and verifies.
pub fn success_summary(tool: &Tool, args: &Args, response: &Value) -> String {
    if let Some(message) = response
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.trim().is_empty())
    {
        return message.to_string();
    }
    let title = arg_str(args, "title");
    match (tool, title) {
        (Tool::CreateTask, Some(title)) => format!("Created task \"{title}\"."),
        (Tool::CreateSubtask, Some(title)) => format!("Added subtask \"{title}\"."),
        (Tool::UpdateTask, _) => "Task updated.".to_string(),
        (Tool::DeleteTask, _) => "Task deleted.".to_string(),
        (Tool::Comment, _) => "Comment added.".to_string(),
        (Tool::BreakdownTask, _) => "Task broken down into subtasks.".to_string(),
        (Tool::CreateBug | Tool::CreateBugFromText, _) => "Bug reported.".to_string(),
        (Tool::UpdateBug, _) => "Bug updated.".to_string(),
        (Tool::DeleteBug, _) => "Bug deleted.".to_string(),
        (Tool::UpdateSubtask, _) => "Subtask updated.".to_string(),
        (Tool::DeleteSubtask, _) => "Subtask deleted.".to_string(),
        (other, _) => format!("{other} completed."),
    }
}
