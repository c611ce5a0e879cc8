//! SprintPilot - conversational tool-call orchestrator
//!
//! Turns free-text model responses into operator-confirmed, verified calls
//! against a project-management backend.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): directives, tools, resolution and
//!   confirmation types, plus the ports for every external collaborator
//! - **Service Layer** (`services`): parser, resolver, confirmation gate,
//!   step executor, verifier and the conversation session
//! - **Adapters** (`adapters`): reqwest implementations of the ports
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```
//! use sprintpilot::domain::models::{ParsedResponse, Tool};
//! use sprintpilot::services::parse_response;
//!
//! let parsed = parse_response("```json\n{\"tool\": \"get_task_details\", \"args\": {}}\n```");
//! let ParsedResponse::Single(directive) = parsed else { unreachable!() };
//! assert!(Tool::from_raw(&directive.tool).is_reader());
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{Config, Directive, ParsedResponse, Plan, Tool, Transcript};
pub use domain::ports::{ChatClient, EntityLookup, Operator, TaskQuery, ToolInvoker};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{ConversationSession, StepExecutor, TurnOutcome, TurnReport};
