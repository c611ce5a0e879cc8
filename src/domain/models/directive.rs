//! Directives and plans extracted from model output.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Arguments carried by a directive, keyed by the backend's field names.
pub type Args = Map<String, Value>;

/// A single `{tool, args}` instruction emitted by the model.
///
/// `tool` is raw model text; it is only trusted after
/// [`Tool::from_raw`](super::tool::Tool::from_raw) has normalized and
/// classified it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Directive {
    pub tool: String,
    pub args: Args,
}

impl Directive {
    pub fn new(tool: impl Into<String>, args: Args) -> Self {
        Self {
            tool: tool.into(),
            args,
        }
    }
}

/// String value of `key` in `args`, ignoring empty and whitespace-only values.
pub fn arg_str<'a>(args: &'a Args, key: &str) -> Option<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Human-readable steps awaiting operator approval before any directive runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub steps: Vec<String>,
}

impl Plan {
    /// Numbered list of steps followed by the approval prompt.
    pub fn render(&self) -> String {
        let mut lines: Vec<String> = self
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| format!("{}. {}", i + 1, step))
            .collect();
        lines.push(String::new());
        lines.push("Proceed?".to_string());
        lines.join("\n")
    }
}

/// What the parser found in one block of model text.
///
/// Exactly one shape is produced per response.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedResponse {
    /// Steps that need explicit approval; no directive exists yet.
    Plan(Plan),
    /// An already-approved, ordered multi-step sequence.
    Steps(Vec<Directive>),
    Single(Directive),
    /// No recognizable directive. The text is ordinary conversation.
    Chat,
}

impl ParsedResponse {
    /// Directives to enqueue, in order. Plans and chat produce none.
    pub fn into_directives(self) -> Vec<Directive> {
        match self {
            Self::Steps(steps) => steps,
            Self::Single(directive) => vec![directive],
            Self::Plan(_) | Self::Chat => Vec::new(),
        }
    }
}
