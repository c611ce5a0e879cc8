//! Entity resolution types.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of entity a free-text name can be resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Project,
    Task,
    User,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Project => write!(f, "project"),
            Self::Task => write!(f, "task"),
            Self::User => write!(f, "user"),
        }
    }
}

/// Scope sent alongside a lookup to narrow the candidate set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
}

impl ResolutionContext {
    pub fn is_empty(&self) -> bool {
        self.project_id.is_none() && self.workspace_id.is_none()
    }
}

/// Best fuzzy match returned by a lookup endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionMatch {
    pub id: String,
    pub score: f64,
}

impl ResolutionMatch {
    /// Apply the confidence gate: matches under `min_score` count as no match.
    pub fn accept(candidate: Option<Self>, min_score: f64) -> Option<Self> {
        candidate.filter(|m| m.score >= min_score && !m.id.trim().is_empty())
    }
}

/// Whether a value is already a canonical identifier that needs no lookup:
/// a UUID, or a platform user id such as `user_2aXk9...`.
pub fn looks_like_id(value: &str) -> bool {
    let value = value.trim();
    if Uuid::parse_str(value).is_ok() {
        return true;
    }
    value.strip_prefix("user_").is_some_and(|rest| {
        rest.len() >= 8 && rest.chars().all(|c| c.is_ascii_alphanumeric())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looks_like_id() {
        assert!(looks_like_id("11111111-1111-1111-1111-111111111111"));
        assert!(looks_like_id(" 550e8400-e29b-41d4-a716-446655440000 "));
        assert!(looks_like_id("user_2aXk9PqLmN"));
        assert!(!looks_like_id("user_ab"));
        assert!(!looks_like_id("Fix bug"));
        assert!(!looks_like_id("abc"));
        assert!(!looks_like_id(""));
    }

    #[test]
    fn test_accept_applies_threshold() {
        let low = Some(ResolutionMatch {
            id: "p1".to_string(),
            score: 0.29,
        });
        assert_eq!(ResolutionMatch::accept(low, 0.3), None);

        let exact = Some(ResolutionMatch {
            id: "p1".to_string(),
            score: 0.3,
        });
        assert_eq!(
            ResolutionMatch::accept(exact, 0.3).map(|m| m.id),
            Some("p1".to_string())
        );
        assert_eq!(ResolutionMatch::accept(None, 0.3), None);
    }
}
