use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Number;

use crate::domain::errors::BackendResult;

/// Minimal view of a task or subtask as returned by the re-fetch endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, alias = "name")]
    pub title: String,
    #[serde(default)]
    pub project_id: Option<String>,
}

impl TaskRecord {
    /// Exact title comparison, ignoring case and surrounding whitespace.
    pub fn title_matches(&self, title: &str) -> bool {
        self.title.trim().to_lowercase() == title.trim().to_lowercase()
    }

    /// Whether the record can belong to `project_id`. Records or scopes
    /// without a project are not excluded.
    pub fn in_project(&self, project_id: Option<&str>) -> bool {
        match (self.project_id.as_deref(), project_id) {
            (Some(own), Some(wanted)) => own == wanted,
            _ => true,
        }
    }
}

/// Backends disagree on id types; numeric ids are kept as their decimal text.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}

/// Read-only queries used to verify that a write took effect.
#[async_trait]
pub trait TaskQuery: Send + Sync {
    /// Fetch a task by id. `Ok(None)` when the backend reports it missing.
    async fn task_by_id(&self, task_id: &str) -> BackendResult<Option<TaskRecord>>;

    async fn subtasks_of(&self, parent_task_id: &str) -> BackendResult<Vec<TaskRecord>>;

    /// Tasks whose title matches `title`, optionally scoped to a project.
    async fn search_by_title(
        &self,
        title: &str,
        project_id: Option<&str>,
    ) -> BackendResult<Vec<TaskRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_id_decodes_as_text() {
        let record: TaskRecord =
            serde_json::from_value(json!({"id": 42, "title": "T"})).expect("decode");
        assert_eq!(record.id, "42");

        let record: TaskRecord =
            serde_json::from_value(json!({"id": "abc", "name": "Legacy"})).expect("decode");
        assert_eq!(record.id, "abc");
        assert_eq!(record.title, "Legacy");
    }

    #[test]
    fn test_in_project_only_excludes_a_different_project() {
        let record = TaskRecord {
            id: "t1".to_string(),
            title: "T".to_string(),
            project_id: Some("p1".to_string()),
        };
        assert!(record.in_project(Some("p1")));
        assert!(record.in_project(None));
        assert!(!record.in_project(Some("p2")));

        let unscoped = TaskRecord {
            project_id: None,
            ..record
        };
        assert!(unscoped.in_project(Some("p2")));
    }
}
