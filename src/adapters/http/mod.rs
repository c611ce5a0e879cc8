//! reqwest adapters for the project-management backend.
//!
//! - [`HttpToolClient`]: tool endpoints, name resolvers and task re-fetches
//! - [`HttpChatClient`]: chat completion

mod backend;
pub mod chat_client;
pub mod tool_client;

pub use backend::BackendHttp;
pub use chat_client::HttpChatClient;
pub use tool_client::HttpToolClient;
