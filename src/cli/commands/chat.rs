//! Interactive chat session.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use console::style;
use serde::Serialize;
use tracing::info;

use crate::adapters::http::{BackendHttp, HttpChatClient, HttpToolClient};
use crate::cli::output::{output, CommandOutput};
use crate::cli::terminal::Terminal;
use crate::domain::errors::SessionError;
use crate::domain::models::{ChatMessage, Config, Role};
use crate::services::{ConversationSession, TurnOutcome};

const HELP: &str = "Commands:
  /approve   run the pending plan
  /reject    discard the pending plan
  /history   show the whole conversation
  /quit      leave
Anything else is sent to the assistant.";

#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Project the conversation is scoped to (overrides session.default_project_id)
    #[arg(short, long)]
    pub project: Option<String>,

    /// Workspace used to scope task lookups (overrides session.workspace_id)
    #[arg(short, long)]
    pub workspace: Option<String>,
}

/// One REPL input line, decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput<'a> {
    Message(&'a str),
    Approve,
    Reject,
    History,
    Help,
    Quit,
    Empty,
    Unknown(&'a str),
}

pub fn parse_input(line: &str) -> ChatInput<'_> {
    let line = line.trim();
    if line.is_empty() {
        return ChatInput::Empty;
    }
    if !line.starts_with('/') {
        return ChatInput::Message(line);
    }
    match line {
        "/approve" => ChatInput::Approve,
        "/reject" => ChatInput::Reject,
        "/history" => ChatInput::History,
        "/help" => ChatInput::Help,
        "/quit" | "/exit" => ChatInput::Quit,
        other => ChatInput::Unknown(other),
    }
}

#[derive(Debug, Serialize)]
pub struct TurnOutput {
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discarded: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aborted: Option<String>,
    pub messages: Vec<String>,
}

impl TurnOutput {
    fn new(outcome: &TurnOutcome, appended: &[ChatMessage]) -> Self {
        let messages = assistant_messages(appended);
        match outcome {
            TurnOutcome::Chat => Self::bare("chat", messages),
            TurnOutcome::PlanProposed(_) => Self::bare("plan", messages),
            TurnOutcome::Executed(report) => Self {
                outcome: if report.is_success() { "executed" } else { "aborted" },
                completed: Some(report.completed),
                discarded: Some(report.discarded),
                aborted: report.aborted.as_ref().map(ToString::to_string),
                messages,
            },
        }
    }

    fn bare(outcome: &'static str, messages: Vec<String>) -> Self {
        Self {
            outcome,
            completed: None,
            discarded: None,
            aborted: None,
            messages,
        }
    }
}

impl CommandOutput for TurnOutput {
    fn to_human(&self) -> String {
        self.messages.join("\n\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryOutput {
    pub messages: Vec<ChatMessage>,
}

impl CommandOutput for HistoryOutput {
    fn to_human(&self) -> String {
        if self.messages.is_empty() {
            return "No messages yet.".to_string();
        }
        self.messages
            .iter()
            .map(|m| {
                let who = match m.role {
                    Role::User => style("you").cyan().bold(),
                    Role::Assistant => style("assistant").green().bold(),
                };
                format!("{who} [{}]\n{}", m.at.format("%H:%M:%S"), m.content)
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

fn assistant_messages(messages: &[ChatMessage]) -> Vec<String> {
    messages
        .iter()
        .filter(|m| m.role == Role::Assistant)
        .map(|m| m.content.clone())
        .collect()
}

pub async fn execute(args: ChatArgs, config: &Config, json_mode: bool) -> Result<()> {
    let backend = BackendHttp::new(&config.backend)?;
    let tools = Arc::new(HttpToolClient::new(backend.clone()));
    let chat = Arc::new(HttpChatClient::new(backend.clone()));

    let project_id = args
        .project
        .or_else(|| config.session.default_project_id.clone());
    let workspace_id = args
        .workspace
        .or_else(|| config.session.workspace_id.clone());

    let mut session = ConversationSession::assemble(chat, tools, config.resolution.min_score)
        .with_scope(project_id, workspace_id);
    let terminal = Terminal::new(!json_mode);

    info!(base_url = backend.base_url(), project = ?session.project_id(), "chat session started");
    if !json_mode {
        println!(
            "{} connected to {}. Type /help for commands.",
            style("sprintpilot").bold(),
            backend.base_url()
        );
    }

    while let Some(line) = terminal.read_line("> ").await? {
        let before = session.transcript().len();
        let result = match parse_input(&line) {
            ChatInput::Empty => continue,
            ChatInput::Quit => break,
            ChatInput::Help => {
                println!("{HELP}");
                continue;
            }
            ChatInput::Unknown(command) => {
                eprintln!("Unknown command {command}. Type /help for commands.");
                continue;
            }
            ChatInput::History => {
                let history = HistoryOutput {
                    messages: session.transcript().messages().to_vec(),
                };
                output(&history, json_mode);
                continue;
            }
            ChatInput::Reject => session.reject_plan().map(|_| TurnOutcome::Chat),
            ChatInput::Approve => {
                terminal.start_activity("Thinking...");
                let result = session.approve_plan(&terminal).await;
                terminal.stop_activity();
                result
            }
            ChatInput::Message(message) => {
                terminal.start_activity("Thinking...");
                let result = session.send(message, &terminal).await;
                terminal.stop_activity();
                result
            }
        };

        match result {
            Ok(outcome) => {
                let turn = TurnOutput::new(&outcome, session.transcript().since(before));
                output(&turn, json_mode);
            }
            Err(SessionError::NoPendingPlan) => {
                eprintln!("{}", SessionError::NoPendingPlan);
            }
            Err(err @ SessionError::Chat(_)) => {
                // The failure is already in the transcript; keep the session alive.
                eprintln!("{} {err}", style("error:").red().bold());
            }
        }
    }

    Ok(())
}
