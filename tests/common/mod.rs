//! Common test utilities for integration tests
//!
//! An in-memory backend implementing every port, a scripted operator and a
//! scripted chat model. Each records what it was asked so tests can assert
//! on call order.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use sprintpilot::domain::errors::{BackendError, BackendResult};
use sprintpilot::domain::models::{
    Args, Decision, Directive, EntityKind, PendingConfirmation, ResolutionContext, ResolutionMatch,
};
use sprintpilot::domain::ports::{
    ChatClient, ChatRequest, ChatResponse, EntityLookup, Operator, TaskQuery, TaskRecord,
    ToolInvoker,
};
use sprintpilot::services::{ConfirmationGate, EntityResolver, PostExecutionVerifier, StepExecutor};

pub const PROJECT_ID: &str = "11111111-1111-1111-1111-111111111111";

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn args(value: Value) -> Args {
    value.as_object().cloned().unwrap_or_default()
}

pub fn directive(tool: &str, value: Value) -> Directive {
    Directive::new(tool, args(value))
}

/// One call that reached the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Read { endpoint: String, args: Args },
    Write { endpoint: String, args: Args },
    Lookup { entity: EntityKind, name: String },
    TaskById(String),
    Subtasks(String),
    Search {
        title: String,
        project_id: Option<String>,
    },
}

#[derive(Default)]
pub struct FakeBackend {
    calls: Mutex<Vec<Call>>,
    reads: Mutex<HashMap<String, BackendResult<Value>>>,
    writes: Mutex<HashMap<String, VecDeque<BackendResult<Value>>>>,
    names: Mutex<HashMap<(EntityKind, String), ResolutionMatch>>,
    tasks: Mutex<Vec<TaskRecord>>,
    subtasks: Mutex<Vec<(String, TaskRecord)>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on_read(&self, endpoint: &str, result: BackendResult<Value>) {
        self.reads
            .lock()
            .expect("lock")
            .insert(endpoint.to_string(), result);
    }

    /// Queue a response for the next write to `endpoint`. Unqueued writes
    /// answer `{}`.
    pub fn on_write(&self, endpoint: &str, result: BackendResult<Value>) {
        self.writes
            .lock()
            .expect("lock")
            .entry(endpoint.to_string())
            .or_default()
            .push_back(result);
    }

    pub fn knows(&self, entity: EntityKind, name: &str, id: &str, score: f64) {
        self.names.lock().expect("lock").insert(
            (entity, name.to_string()),
            ResolutionMatch {
                id: id.to_string(),
                score,
            },
        );
    }

    pub fn add_task(&self, id: &str, title: &str) {
        self.tasks.lock().expect("lock").push(TaskRecord {
            id: id.to_string(),
            title: title.to_string(),
            project_id: None,
        });
    }

    pub fn add_task_in(&self, project_id: &str, id: &str, title: &str) {
        self.tasks.lock().expect("lock").push(TaskRecord {
            id: id.to_string(),
            title: title.to_string(),
            project_id: Some(project_id.to_string()),
        });
    }

    pub fn add_subtask(&self, parent: &str, id: &str, title: &str) {
        self.subtasks.lock().expect("lock").push((
            parent.to_string(),
            TaskRecord {
                id: id.to_string(),
                title: title.to_string(),
                project_id: None,
            },
        ));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("lock").clone()
    }

    pub fn writes(&self) -> Vec<(String, Args)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Write { endpoint, args } => Some((endpoint, args)),
                _ => None,
            })
            .collect()
    }

    pub fn reads(&self) -> Vec<(String, Args)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Read { endpoint, args } => Some((endpoint, args)),
                _ => None,
            })
            .collect()
    }

    pub fn lookups(&self) -> Vec<(EntityKind, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Lookup { entity, name } => Some((entity, name)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("lock").push(call);
    }
}

#[async_trait]
impl ToolInvoker for FakeBackend {
    async fn read(&self, endpoint: &str, args: &Args) -> BackendResult<Value> {
        self.record(Call::Read {
            endpoint: endpoint.to_string(),
            args: args.clone(),
        });
        self.reads
            .lock()
            .expect("lock")
            .get(endpoint)
            .cloned()
            .unwrap_or_else(|| Ok(json!([])))
    }

    async fn write(&self, endpoint: &str, args: &Args) -> BackendResult<Value> {
        self.record(Call::Write {
            endpoint: endpoint.to_string(),
            args: args.clone(),
        });
        self.writes
            .lock()
            .expect("lock")
            .get_mut(endpoint)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Ok(json!({})))
    }
}

#[async_trait]
impl EntityLookup for FakeBackend {
    async fn lookup(
        &self,
        entity: EntityKind,
        name: &str,
        _context: &ResolutionContext,
    ) -> BackendResult<Option<ResolutionMatch>> {
        self.record(Call::Lookup {
            entity,
            name: name.to_string(),
        });
        Ok(self
            .names
            .lock()
            .expect("lock")
            .get(&(entity, name.to_string()))
            .cloned())
    }
}

#[async_trait]
impl TaskQuery for FakeBackend {
    async fn task_by_id(&self, task_id: &str) -> BackendResult<Option<TaskRecord>> {
        self.record(Call::TaskById(task_id.to_string()));
        Ok(self
            .tasks
            .lock()
            .expect("lock")
            .iter()
            .find(|t| t.id == task_id)
            .cloned())
    }

    async fn subtasks_of(&self, parent_task_id: &str) -> BackendResult<Vec<TaskRecord>> {
        self.record(Call::Subtasks(parent_task_id.to_string()));
        Ok(self
            .subtasks
            .lock()
            .expect("lock")
            .iter()
            .filter(|(parent, _)| parent == parent_task_id)
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn search_by_title(
        &self,
        title: &str,
        project_id: Option<&str>,
    ) -> BackendResult<Vec<TaskRecord>> {
        self.record(Call::Search {
            title: title.to_string(),
            project_id: project_id.map(str::to_string),
        });
        Ok(self
            .tasks
            .lock()
            .expect("lock")
            .iter()
            .filter(|t| project_id.is_none() || t.project_id.as_deref() == project_id)
            .cloned()
            .collect())
    }
}

pub fn server_error(status: u16, message: &str) -> BackendResult<Value> {
    Err(BackendError::Status {
        status,
        message: message.to_string(),
    })
}

/// Answers confirmations from a script; rejects once the script runs out.
#[derive(Default)]
pub struct ScriptedOperator {
    decisions: Mutex<VecDeque<Decision>>,
    reviewed: Mutex<Vec<PendingConfirmation>>,
}

impl ScriptedOperator {
    pub fn new(decisions: impl IntoIterator<Item = Decision>) -> Self {
        Self {
            decisions: Mutex::new(decisions.into_iter().collect()),
            reviewed: Mutex::new(Vec::new()),
        }
    }

    pub fn accepting_all() -> Self {
        Self::new(std::iter::repeat(Decision::Accept).take(16))
    }

    pub fn reviewed(&self) -> Vec<PendingConfirmation> {
        self.reviewed.lock().expect("lock").clone()
    }
}

#[async_trait]
impl Operator for ScriptedOperator {
    async fn review(&self, pending: &PendingConfirmation) -> Decision {
        self.reviewed.lock().expect("lock").push(pending.clone());
        self.decisions
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or(Decision::Reject)
    }
}

/// Model that replays canned responses and records each request.
#[derive(Default)]
pub struct ScriptedChat {
    responses: Mutex<VecDeque<BackendResult<String>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedChat {
    pub fn new(responses: impl IntoIterator<Item = &'static str>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().map(|r| Ok(r.to_string())).collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn push_failure(&self, err: BackendError) {
        self.responses.lock().expect("lock").push_back(Err(err));
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().expect("lock").clone()
    }
}

#[async_trait]
impl ChatClient for ScriptedChat {
    async fn complete(&self, request: &ChatRequest) -> BackendResult<ChatResponse> {
        self.requests.lock().expect("lock").push(request.clone());
        let next = self
            .responses
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_else(|| Ok("Okay.".to_string()));
        next.map(|response| ChatResponse { response })
    }
}

/// Executor wired entirely to `backend`.
pub fn executor(backend: &Arc<FakeBackend>, min_score: f64) -> StepExecutor {
    let resolver = EntityResolver::new(backend.clone(), min_score);
    StepExecutor::new(
        backend.clone(),
        ConfirmationGate::new(resolver),
        PostExecutionVerifier::new(backend.clone()),
    )
}
