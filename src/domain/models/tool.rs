//! Tool name normalization and reader/writer classification.
//!
//! Models emit tool names as free text (`get_task_details`,
//! `post_create_subtask`, `post-breakdown-task`, ...). Everything the
//! executor touches goes through [`Tool::from_raw`] first, so past this
//! boundary a tool is one of a closed set of variants.

use std::fmt;

use serde::{Serialize, Serializer};

/// Whether a tool only reads domain state or mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolAccess {
    /// Auto-executed, never confirmed or verified.
    Reader,
    /// Always gated behind operator confirmation.
    Writer,
}

impl fmt::Display for ToolAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reader => write!(f, "reader"),
            Self::Writer => write!(f, "writer"),
        }
    }
}

/// How a writer's effect is re-checked after the endpoint reports success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationKind {
    CreatedTask,
    Subtask,
    /// HTTP success is accepted on its own.
    None,
}

/// A classified tool.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tool {
    SearchTasks,
    GetTaskDetails,
    SearchBugs,
    GetBugDetails,
    CreateTask,
    UpdateTask,
    DeleteTask,
    Comment,
    BreakdownTask,
    CreateBugFromText,
    CreateBug,
    UpdateBug,
    DeleteBug,
    CreateSubtask,
    UpdateSubtask,
    DeleteSubtask,
    /// `get-` endpoint outside the known set.
    OtherReader(String),
    /// `post-` endpoint outside the known set.
    OtherWriter(String),
    /// Nothing matched; treated as a writer so it can never auto-execute.
    Unrecognized(String),
}

fn known(name: &str) -> Option<Tool> {
    let tool = match name {
        "search-tasks" => Tool::SearchTasks,
        "get-task-details" => Tool::GetTaskDetails,
        "search-bugs" => Tool::SearchBugs,
        "get-bug-details" => Tool::GetBugDetails,
        "create-task" => Tool::CreateTask,
        "update-task" => Tool::UpdateTask,
        "delete-task" => Tool::DeleteTask,
        "comment" => Tool::Comment,
        "breakdown-task" => Tool::BreakdownTask,
        "create-bug-from-text" => Tool::CreateBugFromText,
        "create-bug" => Tool::CreateBug,
        "update-bug" => Tool::UpdateBug,
        "delete-bug" => Tool::DeleteBug,
        "create-subtask" => Tool::CreateSubtask,
        "update-subtask" => Tool::UpdateSubtask,
        "delete-subtask" => Tool::DeleteSubtask,
        _ => return None,
    };
    Some(tool)
}

/// Collapse legacy spellings of a tool name into the hyphenated form used by
/// the `/tools/{name}` endpoints.
///
/// `get_x` becomes `get-x`, a `post_` prefix is dropped, remaining
/// underscores become hyphens, and `post-<known writer>` aliases resolve to
/// the bare writer name.
pub fn normalize_tool_name(raw: &str) -> String {
    let trimmed = raw.trim();
    let collapsed = if let Some(rest) = trimmed.strip_prefix("get_") {
        format!("get-{rest}")
    } else if let Some(rest) = trimmed.strip_prefix("post_") {
        rest.to_string()
    } else {
        trimmed.to_string()
    };
    let hyphenated = collapsed.replace('_', "-");

    if let Some(rest) = hyphenated.strip_prefix("post-") {
        if known(rest).is_some_and(|tool| tool.access() == ToolAccess::Writer) {
            return rest.to_string();
        }
    }
    hyphenated
}

impl Tool {
    /// Normalize and classify a raw model-supplied tool name.
    pub fn from_raw(raw: &str) -> Self {
        let name = normalize_tool_name(raw);
        if let Some(tool) = known(&name) {
            return tool;
        }
        if name.starts_with("get-") {
            return Self::OtherReader(name);
        }
        if name.starts_with("post-") {
            return Self::OtherWriter(name);
        }
        tracing::warn!(
            raw_tool = %raw,
            normalized = %name,
            "unrecognized tool name, treating as writer"
        );
        Self::Unrecognized(name)
    }

    /// Endpoint name under `/tools/`.
    pub fn endpoint(&self) -> &str {
        match self {
            Self::SearchTasks => "search-tasks",
            Self::GetTaskDetails => "get-task-details",
            Self::SearchBugs => "search-bugs",
            Self::GetBugDetails => "get-bug-details",
            Self::CreateTask => "create-task",
            Self::UpdateTask => "update-task",
            Self::DeleteTask => "delete-task",
            Self::Comment => "comment",
            Self::BreakdownTask => "breakdown-task",
            Self::CreateBugFromText => "create-bug-from-text",
            Self::CreateBug => "create-bug",
            Self::UpdateBug => "update-bug",
            Self::DeleteBug => "delete-bug",
            Self::CreateSubtask => "create-subtask",
            Self::UpdateSubtask => "update-subtask",
            Self::DeleteSubtask => "delete-subtask",
            Self::OtherReader(name) | Self::OtherWriter(name) | Self::Unrecognized(name) => name,
        }
    }

    pub const fn access(&self) -> ToolAccess {
        match self {
            Self::SearchTasks
            | Self::GetTaskDetails
            | Self::SearchBugs
            | Self::GetBugDetails
            | Self::OtherReader(_) => ToolAccess::Reader,
            _ => ToolAccess::Writer,
        }
    }

    pub const fn is_reader(&self) -> bool {
        matches!(self.access(), ToolAccess::Reader)
    }

    /// Subtask tools share parent-task inheritance and title verification.
    pub const fn is_subtask_family(&self) -> bool {
        matches!(
            self,
            Self::CreateSubtask | Self::UpdateSubtask | Self::DeleteSubtask
        )
    }

    /// True for every writer in the fixed known set.
    pub const fn is_known_writer(&self) -> bool {
        !self.is_reader()
            && !matches!(self, Self::OtherWriter(_) | Self::Unrecognized(_))
    }

    pub const fn verification(&self) -> VerificationKind {
        match self {
            Self::CreateTask => VerificationKind::CreatedTask,
            Self::CreateSubtask | Self::UpdateSubtask => VerificationKind::Subtask,
            _ => VerificationKind::None,
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

impl Serialize for Tool {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.endpoint())
    }
}
