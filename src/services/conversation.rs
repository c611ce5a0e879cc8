//! Conversation session: one operator talking to the model.
//!
//! Owns the transcript and routes every model response through the parser.
//! Plans are held until the operator approves or rejects them; directives go
//! straight to the step executor. Everything but the transcript is torn
//! down when the next turn starts.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::domain::errors::SessionError;
use crate::domain::models::{ParsedResponse, Plan, ResolutionContext, Transcript};
use crate::domain::ports::{ChatClient, ChatRequest, EntityLookup, Operator, TaskQuery, ToolInvoker};

use super::confirmation_gate::ConfirmationGate;
use super::directive_parser::parse_response;
use super::entity_resolver::EntityResolver;
use super::step_executor::{StepExecutor, TurnReport};
use super::verifier::PostExecutionVerifier;

const PLAN_APPROVED_MESSAGE: &str = "Approved. Go ahead with the plan.";

/// What one turn produced.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// Ordinary conversation; the model text was appended as-is.
    Chat,
    /// A plan awaits approval. Nothing has been executed.
    PlanProposed(Plan),
    /// Directives ran through the step queue.
    Executed(TurnReport),
}

pub struct ConversationSession {
    chat: Arc<dyn ChatClient>,
    executor: StepExecutor,
    transcript: Transcript,
    pending_plan: Option<Plan>,
    project_id: Option<String>,
}

impl ConversationSession {
    pub fn new(chat: Arc<dyn ChatClient>, executor: StepExecutor) -> Self {
        Self {
            chat,
            executor,
            transcript: Transcript::new(),
            pending_plan: None,
            project_id: None,
        }
    }

    /// Wire a session whose tool, lookup and re-fetch ports are all served by
    /// one backend client.
    pub fn assemble<B>(chat: Arc<dyn ChatClient>, backend: Arc<B>, min_score: f64) -> Self
    where
        B: ToolInvoker + EntityLookup + TaskQuery + 'static,
    {
        let resolver = EntityResolver::new(backend.clone(), min_score);
        let verifier = PostExecutionVerifier::new(backend.clone());
        let executor = StepExecutor::new(backend, ConfirmationGate::new(resolver), verifier);
        Self::new(chat, executor)
    }

    /// Scope the conversation to a project (and optionally a workspace).
    #[must_use]
    pub fn with_scope(mut self, project_id: Option<String>, workspace_id: Option<String>) -> Self {
        self.executor.set_ambient(ResolutionContext {
            project_id: project_id.clone(),
            workspace_id,
        });
        self.project_id = project_id;
        self
    }

    pub const fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub const fn pending_plan(&self) -> Option<&Plan> {
        self.pending_plan.as_ref()
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    /// Send one operator message and act on the model's reply.
    ///
    /// Starting a turn discards any plan still awaiting approval.
    #[instrument(skip_all)]
    pub async fn send(
        &mut self,
        message: &str,
        operator: &dyn Operator,
    ) -> Result<TurnOutcome, SessionError> {
        if self.pending_plan.take().is_some() {
            info!("pending plan discarded by new message");
        }
        self.exchange(message, None, operator).await
    }

    /// Approve the pending plan. The model is asked to emit the directives,
    /// which then run like any other turn.
    #[instrument(skip_all)]
    pub async fn approve_plan(&mut self, operator: &dyn Operator) -> Result<TurnOutcome, SessionError> {
        let plan = self.pending_plan.take().ok_or(SessionError::NoPendingPlan)?;
        info!(steps = plan.steps.len(), "plan approved");
        self.exchange(PLAN_APPROVED_MESSAGE, Some(plan.steps), operator)
            .await
    }

    /// Reject the pending plan. No directive from it is ever executed.
    pub fn reject_plan(&mut self) -> Result<Plan, SessionError> {
        let plan = self.pending_plan.take().ok_or(SessionError::NoPendingPlan)?;
        info!(steps = plan.steps.len(), "plan rejected");
        self.transcript.push_assistant("Plan cancelled.");
        Ok(plan)
    }

    async fn exchange(
        &mut self,
        message: &str,
        plan_approved_steps: Option<Vec<String>>,
        operator: &dyn Operator,
    ) -> Result<TurnOutcome, SessionError> {
        let request = ChatRequest {
            message: message.to_string(),
            project_id: self.project_id.clone(),
            history: self.transcript.messages().to_vec(),
            plan_approved_steps,
        };
        self.transcript.push_user(message);

        let response = match self.chat.complete(&request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "chat completion failed");
                self.transcript.push_assistant(format!("Error: {}", err.message()));
                return Err(err.into());
            }
        };

        match parse_response(&response.response) {
            ParsedResponse::Chat => {
                self.transcript.push_assistant(response.response);
                Ok(TurnOutcome::Chat)
            }
            ParsedResponse::Plan(plan) => {
                self.transcript.push_assistant(plan.render());
                self.pending_plan = Some(plan.clone());
                Ok(TurnOutcome::PlanProposed(plan))
            }
            parsed => {
                let report = self
                    .executor
                    .run(parsed.into_directives(), operator, &mut self.transcript)
                    .await;
                Ok(TurnOutcome::Executed(report))
            }
        }
    }
}
