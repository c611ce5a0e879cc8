//! Domain errors for the sprintpilot orchestrator.

use thiserror::Error;

use super::models::resolution::EntityKind;

/// Failure talking to one of the external collaborators (tool endpoints,
/// resolvers, chat completion).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The endpoint answered with a non-success status. `message` is the
    /// backend's own error text (the `error` field when the body is JSON,
    /// otherwise the raw body).
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl BackendError {
    /// HTTP status code, when the failure came from a response.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Backend error text suitable for showing to the operator verbatim.
    pub fn message(&self) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Misuse of the confirmation gate state machine.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum GateError {
    #[error("A confirmation is already pending")]
    AlreadyAwaiting,

    #[error("No confirmation is pending")]
    NothingPending,
}

/// Errors that abort a step queue.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrchestratorError {
    #[error("Could not find {entity} \"{name}\"")]
    Resolution { entity: EntityKind, name: String },

    #[error("{0}")]
    Invocation(String),

    #[error("Response received, but verification failed: {0}")]
    Verification(String),

    #[error("Cancelled by operator")]
    Rejected,

    #[error(transparent)]
    Gate(#[from] GateError),
}

impl OrchestratorError {
    /// Text appended to the transcript when this error stops a queue.
    pub fn transcript_text(&self) -> String {
        match self {
            Self::Verification(_) => self.to_string(),
            Self::Rejected => "Cancelled. The remaining steps were discarded.".to_string(),
            other => format!("Error: {other}"),
        }
    }
}

impl From<BackendError> for OrchestratorError {
    fn from(err: BackendError) -> Self {
        Self::Invocation(err.message())
    }
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

/// Errors surfaced by a conversation turn outside the step queue.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("No plan is awaiting approval")]
    NoPendingPlan,

    #[error("Chat request failed: {0}")]
    Chat(#[from] BackendError),
}
