//! Orchestration services.
//!
//! - DirectiveParser: model text to plan / steps / single directive / chat
//! - EntityResolver: names to canonical ids through the lookup port
//! - ConfirmationGate: operator approval state machine for writers
//! - StepExecutor: strict FIFO execution of one turn's directives
//! - PostExecutionVerifier: read-back of task and subtask writes
//! - ConversationSession: transcript ownership and plan approval

pub mod confirmation_gate;
pub mod conversation;
pub mod directive_parser;
pub mod entity_resolver;
pub mod step_executor;
pub mod verifier;

pub use confirmation_gate::{AcceptedWriter, ConfirmationGate, GateState};
pub use conversation::{ConversationSession, TurnOutcome};
pub use directive_parser::{extract_fenced_json, parse_response};
pub use entity_resolver::EntityResolver;
pub use step_executor::{success_summary, StepExecutor, TurnReport};
pub use verifier::{created_task_id, PostExecutionVerifier, Verification};
