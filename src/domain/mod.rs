//! Domain layer for the sprintpilot orchestrator
//!
//! Directives, tools, resolution and confirmation types plus the ports the
//! orchestrator uses to reach its external collaborators.

pub mod errors;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use errors::{
    BackendError, BackendResult, GateError, OrchestratorError, OrchestratorResult, SessionError,
};
