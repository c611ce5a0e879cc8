//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that adapters must implement:
//! - ToolInvoker: `/tools/{name}` read and write endpoints
//! - EntityLookup: fuzzy name-to-id resolution endpoints
//! - TaskQuery: read-only re-fetches used for post-write verification
//! - ChatClient: chat-completion endpoint producing model text
//! - Operator: the human who accepts or rejects pending writers

pub mod chat_client;
pub mod entity_lookup;
pub mod operator;
pub mod task_query;
pub mod tool_invoker;

pub use chat_client::{ChatClient, ChatRequest, ChatResponse};
pub use entity_lookup::EntityLookup;
pub use operator::Operator;
pub use task_query::{TaskQuery, TaskRecord};
pub use tool_invoker::ToolInvoker;
