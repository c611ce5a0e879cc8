//! The single pending writer awaiting operator confirmation.

use serde::Serialize;
use serde_json::Value;

use super::directive::{Args, Directive};
use super::resolution::EntityKind;
use super::tool::Tool;

/// Outcome of resolving one name-shaped argument for the preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FieldResolution {
    /// The value was already a canonical id; no lookup was made.
    AlreadyId { id: String },
    Resolved { name: String, id: String },
    /// No match at or above the confidence threshold.
    Unresolved { name: String },
}

impl FieldResolution {
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::AlreadyId { id } | Self::Resolved { id, .. } => Some(id),
            Self::Unresolved { .. } => None,
        }
    }
}

/// One name-shaped argument tracked through preview and acceptance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedField {
    pub entity: EntityKind,
    /// Argument key the resolved id is written to (`projectId`, `taskId`, `assigneeId`).
    pub id_key: &'static str,
    pub resolution: FieldResolution,
}

/// A writer directive held by the confirmation gate.
#[derive(Debug, Clone, Serialize)]
pub struct PendingConfirmation {
    pub directive: Directive,
    pub tool: Tool,
    /// Arguments with every resolvable name replaced by its id.
    pub resolved_args: Args,
    pub fields: Vec<ResolvedField>,
}

impl PendingConfirmation {
    /// Preview shown to the operator before Accept/Reject.
    pub fn render(&self) -> String {
        let mut lines = vec![format!("Confirm {}:", self.tool)];
        for (key, value) in &self.resolved_args {
            let shown = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            lines.push(format!("  {key}: {shown}"));
        }
        for field in self.unresolved() {
            if let FieldResolution::Unresolved { name } = &field.resolution {
                lines.push(format!("  ({} \"{name}\" not found yet)", field.entity));
            }
        }
        lines.join("\n")
    }

    /// Fields whose preview lookup found nothing.
    pub fn unresolved(&self) -> impl Iterator<Item = &ResolvedField> {
        self.fields
            .iter()
            .filter(|f| matches!(f.resolution, FieldResolution::Unresolved { .. }))
    }
}

/// Operator verdict on a pending confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject,
}
