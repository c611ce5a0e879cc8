//! Confirmation gate for writer directives.
//!
//! Two states: `Idle` and `AwaitingConfirmation`. Opening the gate resolves
//! every name-shaped argument so the operator sees ids in the preview;
//! accepting returns the best-available resolved arguments, retrying any
//! name the preview could not resolve. There is no timeout and no
//! auto-accept: only [`ConfirmationGate::accept`] and
//! [`ConfirmationGate::reject`] leave the awaiting state.

use tracing::{debug, info};

use crate::domain::errors::{GateError, OrchestratorResult};
use crate::domain::models::{
    Args, Directive, EntityKind, PendingConfirmation, ResolutionContext, ResolvedField, Tool,
};

use super::entity_resolver::EntityResolver;

/// Gate state. Holding a pending confirmation is what blocks the queue.
#[derive(Debug, Clone, Default)]
pub enum GateState {
    #[default]
    Idle,
    AwaitingConfirmation(PendingConfirmation),
}

/// Writer cleared by the operator, ready to invoke.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedWriter {
    pub tool: Tool,
    pub directive: Directive,
    pub args: Args,
}

pub struct ConfirmationGate {
    resolver: EntityResolver,
    ambient: ResolutionContext,
    state: GateState,
}

impl ConfirmationGate {
    pub fn new(resolver: EntityResolver) -> Self {
        Self {
            resolver,
            ambient: ResolutionContext::default(),
            state: GateState::Idle,
        }
    }

    /// Fallback project/workspace scope used when a directive carries none.
    pub fn set_ambient(&mut self, ambient: ResolutionContext) {
        self.ambient = ambient;
    }

    pub const fn state(&self) -> &GateState {
        &self.state
    }

    pub const fn pending(&self) -> Option<&PendingConfirmation> {
        match &self.state {
            GateState::AwaitingConfirmation(pending) => Some(pending),
            GateState::Idle => None,
        }
    }

    pub const fn is_awaiting(&self) -> bool {
        matches!(self.state, GateState::AwaitingConfirmation(_))
    }

    /// Idle -> AwaitingConfirmation.
    ///
    /// Name lookups that miss do not block opening; they are reported in the
    /// preview and retried on accept. `pinned` id keys are taken as-is.
    pub async fn open(
        &mut self,
        tool: Tool,
        directive: Directive,
        pinned: &[&str],
    ) -> Result<&PendingConfirmation, GateError> {
        if self.is_awaiting() {
            return Err(GateError::AlreadyAwaiting);
        }

        let (resolved_args, fields) = self
            .resolver
            .resolve_args(&directive.args, &self.ambient, pinned)
            .await;
        debug!(
            tool = %tool,
            fields = fields.len(),
            "confirmation preview resolved"
        );

        self.state = GateState::AwaitingConfirmation(PendingConfirmation {
            directive,
            tool,
            resolved_args,
            fields,
        });
        self.pending().ok_or(GateError::NothingPending)
    }

    /// AwaitingConfirmation -> Idle, yielding the writer to invoke.
    ///
    /// Names still unresolved are looked up once more. A miss fails the
    /// accept, except a parent-task title on a subtask tool, which is left
    /// for the backend to resolve.
    pub async fn accept(&mut self) -> OrchestratorResult<AcceptedWriter> {
        let pending = self.take_pending()?;
        info!(tool = %pending.tool, "writer accepted");

        let unresolved: Vec<ResolvedField> = pending.unresolved().cloned().collect();
        let mut project_scope = pending
            .fields
            .iter()
            .find(|f| f.entity == EntityKind::Project)
            .and_then(|f| f.resolution.id())
            .map(str::to_string);
        let PendingConfirmation {
            tool,
            directive,
            resolved_args: mut args,
            ..
        } = pending;

        for field in &unresolved {
            let lenient = field.entity == EntityKind::Task && tool.is_subtask_family();
            match self
                .resolver
                .retry_field(&mut args, field, project_scope.as_deref(), &self.ambient)
                .await
            {
                Ok(id) if field.entity == EntityKind::Project => project_scope = Some(id),
                Ok(_) => {}
                Err(_) if lenient => {
                    debug!("parent task title left for backend resolution");
                }
                Err(err) => return Err(err),
            }
        }

        Ok(AcceptedWriter {
            tool,
            directive,
            args,
        })
    }

    /// AwaitingConfirmation -> Idle, discarding the writer.
    pub fn reject(&mut self) -> Result<PendingConfirmation, GateError> {
        let pending = self.take_pending()?;
        info!(tool = %pending.tool, "writer rejected");
        Ok(pending)
    }

    /// Drop any pending confirmation without a verdict. Used when a new turn
    /// starts.
    pub fn reset(&mut self) {
        self.state = GateState::Idle;
    }

    fn take_pending(&mut self) -> Result<PendingConfirmation, GateError> {
        match std::mem::take(&mut self.state) {
            GateState::AwaitingConfirmation(pending) => Ok(pending),
            GateState::Idle => Err(GateError::NothingPending),
        }
    }
}
