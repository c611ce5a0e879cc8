//! Entity resolution: free-text project, task and user names to canonical ids.
//!
//! Every lookup is a single call to the [`EntityLookup`] port, gated by a
//! configurable confidence threshold. Values that already look like ids
//! never reach the port. Resolution has no side effects, so the gate can run
//! it speculatively for previews.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::domain::errors::{OrchestratorError, OrchestratorResult};
use crate::domain::models::{
    arg_str, looks_like_id, Args, EntityKind, FieldResolution, ResolutionContext,
    ResolutionMatch, ResolvedField,
};
use crate::domain::ports::EntityLookup;

/// A name-shaped argument family and the id key it resolves into.
#[derive(Debug, Clone, Copy)]
struct NameField {
    entity: EntityKind,
    name_keys: &'static [&'static str],
    id_key: &'static str,
}

/// Resolved in this order so later lookups can be scoped by earlier ids.
const NAME_FIELDS: [NameField; 3] = [
    NameField {
        entity: EntityKind::Project,
        name_keys: &["projectName", "project"],
        id_key: "projectId",
    },
    NameField {
        entity: EntityKind::Task,
        name_keys: &["taskTitle", "taskName"],
        id_key: "taskId",
    },
    NameField {
        entity: EntityKind::User,
        name_keys: &["assigneeName", "assignee"],
        id_key: "assigneeId",
    },
];

fn field_for(entity: EntityKind) -> NameField {
    match entity {
        EntityKind::Project => NAME_FIELDS[0],
        EntityKind::Task => NAME_FIELDS[1],
        EntityKind::User => NAME_FIELDS[2],
    }
}

/// Resolves names through the lookup port.
#[derive(Clone)]
pub struct EntityResolver {
    lookup: Arc<dyn EntityLookup>,
    min_score: f64,
}

impl EntityResolver {
    pub fn new(lookup: Arc<dyn EntityLookup>, min_score: f64) -> Self {
        Self { lookup, min_score }
    }

    /// Resolve `name` to an id, or `None` when nothing scores at or above the
    /// threshold.
    #[instrument(skip(self, context))]
    pub async fn resolve(
        &self,
        entity: EntityKind,
        name: &str,
        context: &ResolutionContext,
    ) -> Option<String> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        if looks_like_id(name) {
            debug!("value is already an id, skipping lookup");
            return Some(name.to_string());
        }

        let candidate = match self.lookup.lookup(entity, name, context).await {
            Ok(candidate) => candidate,
            Err(err) => {
                warn!(error = %err, name, "lookup call failed, treating as no match");
                None
            }
        };
        let accepted = ResolutionMatch::accept(candidate.clone(), self.min_score);
        if accepted.is_none() {
            if let Some(rejected) = candidate {
                debug!(score = rejected.score, min_score = self.min_score, "match below threshold");
            }
        }
        accepted.map(|m| m.id)
    }

    /// Resolve every name-shaped argument in `args`.
    ///
    /// Resolved ids are written to their id key and the name keys removed.
    /// Unresolved names are left in place and reported so the caller can
    /// retry or fail. `ambient` supplies a fallback project and workspace
    /// scope for task and user lookups. Id keys listed in `pinned` hold ids
    /// the caller produced itself and are never looked up.
    pub async fn resolve_args(
        &self,
        args: &Args,
        ambient: &ResolutionContext,
        pinned: &[&str],
    ) -> (Args, Vec<ResolvedField>) {
        let mut resolved = args.clone();
        let mut fields = Vec::new();
        let mut project_scope: Option<String> = None;

        for field in NAME_FIELDS {
            let Some(name) = name_of(&resolved, field) else {
                continue;
            };
            let resolution = if pinned.contains(&field.id_key) || looks_like_id(&name) {
                FieldResolution::AlreadyId { id: name }
            } else {
                let context =
                    scope_for(field.entity, project_scope.as_deref(), &resolved, ambient);
                match self.resolve(field.entity, &name, &context).await {
                    Some(id) => FieldResolution::Resolved { name, id },
                    None => FieldResolution::Unresolved { name },
                }
            };
            if let Some(id) = resolution.id() {
                apply_id(&mut resolved, field, id);
                if field.entity == EntityKind::Project {
                    project_scope = Some(id.to_string());
                }
            }
            fields.push(ResolvedField {
                entity: field.entity,
                id_key: field.id_key,
                resolution,
            });
        }

        (resolved, fields)
    }

    /// Retry a field whose preview lookup missed, writing the id into `args`.
    ///
    /// `project_id` is the project the directive resolved to, if any; it
    /// scopes task and user lookups ahead of the ambient project. A second
    /// miss is a resolution failure naming the field's value.
    pub async fn retry_field(
        &self,
        args: &mut Args,
        field: &ResolvedField,
        project_id: Option<&str>,
        ambient: &ResolutionContext,
    ) -> OrchestratorResult<String> {
        let name = match &field.resolution {
            FieldResolution::Unresolved { name } => name.clone(),
            FieldResolution::AlreadyId { id } | FieldResolution::Resolved { id, .. } => {
                return Ok(id.clone());
            }
        };
        let target = field_for(field.entity);
        let context = scope_for(field.entity, project_id, args, ambient);
        let id = self
            .resolve(field.entity, &name, &context)
            .await
            .ok_or_else(|| OrchestratorError::Resolution {
                entity: field.entity,
                name: name.clone(),
            })?;
        apply_id(args, target, &id);
        Ok(id)
    }
}

/// Lookup scope for `entity`. A project the directive itself resolved to
/// wins over the ambient one, whatever shape its id has; an unresolved
/// project name in `args` never scopes anything.
fn scope_for(
    entity: EntityKind,
    project_id: Option<&str>,
    args: &Args,
    ambient: &ResolutionContext,
) -> ResolutionContext {
    let project_id = project_id
        .map(str::to_string)
        .or_else(|| ambient.project_id.clone());
    let workspace_id = arg_str(args, "workspaceId")
        .map(str::to_string)
        .or_else(|| ambient.workspace_id.clone());
    match entity {
        EntityKind::Project => ResolutionContext {
            project_id: None,
            workspace_id,
        },
        EntityKind::Task => ResolutionContext {
            project_id,
            workspace_id,
        },
        EntityKind::User => ResolutionContext {
            project_id,
            workspace_id: None,
        },
    }
}

/// The raw value to resolve for `field`: a non-empty id key wins, then the
/// first populated name key.
fn name_of(args: &Args, field: NameField) -> Option<String> {
    arg_str(args, field.id_key)
        .or_else(|| field.name_keys.iter().find_map(|key| arg_str(args, key)))
        .map(str::to_string)
}

fn apply_id(args: &mut Args, field: NameField, id: &str) {
    for key in field.name_keys {
        args.remove(*key);
    }
    args.insert(field.id_key.to_string(), Value::String(id.to_string()));
}
