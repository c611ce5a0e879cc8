pub mod config;
pub mod confirmation;
pub mod conversation;
pub mod directive;
pub mod queue;
pub mod resolution;
pub mod tool;

pub use config::{BackendConfig, Config, LoggingConfig, ResolutionConfig, SessionConfig};
pub use confirmation::{Decision, FieldResolution, PendingConfirmation, ResolvedField};
pub use conversation::{ChatMessage, Role, Transcript};
pub use directive::{arg_str, Args, Directive, ParsedResponse, Plan};
pub use queue::{CrossStepContext, StepQueue};
pub use resolution::{looks_like_id, EntityKind, ResolutionContext, ResolutionMatch};
pub use tool::{normalize_tool_name, Tool, ToolAccess, VerificationKind};
