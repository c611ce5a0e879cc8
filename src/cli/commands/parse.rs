//! Offline parse of a model response: shows what the orchestrator would do
//! with it, without touching the backend.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use serde::Serialize;

use crate::cli::output::{output, supports_color, truncate, CommandOutput};
use crate::domain::models::{Directive, ParsedResponse, Tool, VerificationKind};
use crate::services::parse_response;

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// File holding the model response; stdin when omitted or "-"
    pub file: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct DirectiveOutput {
    pub tool: String,
    pub endpoint: String,
    pub access: String,
    pub gated: bool,
    pub verified: bool,
    pub args: serde_json::Value,
}

impl From<&Directive> for DirectiveOutput {
    fn from(directive: &Directive) -> Self {
        let tool = Tool::from_raw(&directive.tool);
        Self {
            tool: directive.tool.clone(),
            endpoint: tool.endpoint().to_string(),
            access: tool.access().to_string(),
            gated: !tool.is_reader(),
            verified: tool.verification() != VerificationKind::None,
            args: serde_json::Value::Object(directive.args.clone()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ParseOutput {
    pub shape: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub plan: Vec<String>,
    pub directives: Vec<DirectiveOutput>,
}

impl From<&ParsedResponse> for ParseOutput {
    fn from(parsed: &ParsedResponse) -> Self {
        let (shape, plan, directives): (_, Vec<String>, Vec<&Directive>) = match parsed {
            ParsedResponse::Plan(plan) => ("plan", plan.steps.clone(), Vec::new()),
            ParsedResponse::Steps(steps) => ("steps", Vec::new(), steps.iter().collect()),
            ParsedResponse::Single(directive) => ("single", Vec::new(), vec![directive]),
            ParsedResponse::Chat => ("chat", Vec::new(), Vec::new()),
        };
        Self {
            shape,
            plan,
            directives: directives.into_iter().map(DirectiveOutput::from).collect(),
        }
    }
}

impl CommandOutput for ParseOutput {
    fn to_human(&self) -> String {
        match self.shape {
            "chat" => return "No directive found; the response is plain chat.".to_string(),
            "plan" => {
                let steps: Vec<String> = self
                    .plan
                    .iter()
                    .enumerate()
                    .map(|(i, step)| format!("  {}. {step}", i + 1))
                    .collect();
                return format!("Plan awaiting approval:\n{}", steps.join("\n"));
            }
            _ => {}
        }

        let use_colors = supports_color();
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("#").add_attribute(Attribute::Bold),
                Cell::new("Endpoint").add_attribute(Attribute::Bold),
                Cell::new("Access").add_attribute(Attribute::Bold),
                Cell::new("Confirm").add_attribute(Attribute::Bold),
                Cell::new("Verify").add_attribute(Attribute::Bold),
                Cell::new("Args").add_attribute(Attribute::Bold),
            ]);

        for (i, directive) in self.directives.iter().enumerate() {
            let access = if use_colors {
                let color = if directive.gated { Color::Yellow } else { Color::Green };
                Cell::new(&directive.access).fg(color)
            } else {
                Cell::new(&directive.access)
            };
            table.add_row(vec![
                Cell::new(i + 1),
                Cell::new(&directive.endpoint),
                access,
                Cell::new(if directive.gated { "yes" } else { "no" }),
                Cell::new(if directive.verified { "yes" } else { "no" }),
                Cell::new(truncate(&directive.args.to_string(), 60)),
            ]);
        }

        format!("{} directive(s), shape: {}\n{table}", self.directives.len(), self.shape)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) if path.as_os_str() != std::ffi::OsStr::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

pub fn execute(args: &ParseArgs, json_mode: bool) -> Result<()> {
    let text = read_input(args.file.as_ref())?;
    let parsed = parse_response(&text);
    output(&ParseOutput::from(&parsed), json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_output_classifies_directives() {
        let parsed = parse_response(
            r#"{"steps": [{"tool": "get_task_details", "args": {"taskId": "t1"}}, {"tool": "post_create_subtask", "args": {"title": "S"}}]}"#,
        );
        let out = ParseOutput::from(&parsed);
        assert_eq!(out.shape, "steps");
        assert_eq!(out.directives[0].endpoint, "get-task-details");
        assert!(!out.directives[0].gated);
        assert_eq!(out.directives[1].endpoint, "create-subtask");
        assert!(out.directives[1].gated);
        assert!(out.directives[1].verified);
    }

    #[test]
    fn test_chat_and_plan_human_output() {
        let chat = ParseOutput::from(&parse_response("hello"));
        assert!(chat.to_human().contains("plain chat"));

        let plan = ParseOutput::from(&parse_response(r#"{"plan": ["One", "Two"]}"#));
        assert_eq!(plan.to_human(), "Plan awaiting approval:\n  1. One\n  2. Two");
    }

    #[test]
    fn test_read_input_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "{{\"tool\": \"comment\", \"args\": {{}}}}").expect("write");
        let text = read_input(Some(&file.path().to_path_buf())).expect("read");
        assert!(text.contains("comment"));
    }
}
