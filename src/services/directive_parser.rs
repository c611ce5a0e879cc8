//! Directive parsing from model output.
//!
//! Pure text-to-structure translation: a fenced JSON block is preferred,
//! otherwise the whole trimmed response is tried as JSON. The result is one
//! of four mutually exclusive shapes, checked in order: plan, steps, single
//! directive, plain chat.

use serde_json::Value;
use tracing::debug;

use crate::domain::models::{Args, Directive, ParsedResponse, Plan};

const FENCE: &str = "```";

/// Parse one model response.
pub fn parse_response(text: &str) -> ParsedResponse {
    let candidate = extract_fenced_json(text).unwrap_or_else(|| text.trim());
    let Ok(value) = serde_json::from_str::<Value>(candidate) else {
        return ParsedResponse::Chat;
    };
    let parsed = classify_value(&value);
    debug!(shape = shape_name(&parsed), "parsed model response");
    parsed
}

/// Body of the first fenced block tagged `json` or untagged, if any.
///
/// The tag may be followed by a newline, by spaces, or directly by the
/// body, so single-line fences such as ```` ```json{...}``` ```` count too.
pub fn extract_fenced_json(text: &str) -> Option<&str> {
    let mut rest = text;
    while let Some(open) = rest.find(FENCE) {
        let after_open = &rest[open + FENCE.len()..];
        let close = after_open.find(FENCE)?;
        if let Some(body) = json_body(&after_open[..close]) {
            return Some(body);
        }
        rest = &after_open[close + FENCE.len()..];
    }
    None
}

/// Strip the info string from a fence's contents. `None` when the fence is
/// tagged with something other than `json`.
fn json_body(inner: &str) -> Option<&str> {
    let inner = inner.trim_start_matches([' ', '\t']);
    let tag_end = inner
        .find(|c: char| c.is_whitespace() || c == '{' || c == '[')
        .unwrap_or(inner.len());
    let (tag, body) = inner.split_at(tag_end);
    (tag.is_empty() || tag.eq_ignore_ascii_case("json")).then(|| body.trim())
}

fn classify_value(value: &Value) -> ParsedResponse {
    let Some(object) = value.as_object() else {
        return ParsedResponse::Chat;
    };

    if let Some(plan) = object.get("plan").and_then(Value::as_array) {
        if let Some(steps) = plan
            .iter()
            .map(|s| s.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
        {
            return ParsedResponse::Plan(Plan { steps });
        }
    }

    if let Some(steps) = object.get("steps").and_then(Value::as_array) {
        if let Some(directives) = steps.iter().map(directive_from).collect::<Option<Vec<_>>>() {
            return ParsedResponse::Steps(directives);
        }
    }

    directive_from(value).map_or(ParsedResponse::Chat, ParsedResponse::Single)
}

fn directive_from(value: &Value) -> Option<Directive> {
    let object = value.as_object()?;
    let tool = object.get("tool")?.as_str()?.trim();
    if tool.is_empty() {
        return None;
    }
    let args: Args = object.get("args")?.as_object()?.clone();
    Some(Directive::new(tool, args))
}

const fn shape_name(parsed: &ParsedResponse) -> &'static str {
    match parsed {
        ParsedResponse::Plan(_) => "plan",
        ParsedResponse::Steps(_) => "steps",
        ParsedResponse::Single(_) => "single",
        ParsedResponse::Chat => "chat",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fenced_single_directive() {
        let text = "Sure, creating it now.\n```json\n{\"tool\":\"create-task\",\"args\":{\"title\":\"Fix bug\",\"projectId\":\"11111111-1111-1111-1111-111111111111\"}}\n```\nLet me know.";
        let ParsedResponse::Single(directive) = parse_response(text) else {
            panic!("expected single directive");
        };
        assert_eq!(directive.tool, "create-task");
        assert_eq!(directive.args.get("title"), Some(&json!("Fix bug")));
        assert_eq!(
            directive.args.get("projectId"),
            Some(&json!("11111111-1111-1111-1111-111111111111"))
        );
    }

    #[test]
    fn test_bare_json_directive() {
        let text = "  {\"tool\": \"search-tasks\", \"args\": {\"query\": \"login\"}}  ";
        assert_eq!(
            parse_response(text),
            ParsedResponse::Single(Directive::new(
                "search-tasks",
                json!({"query": "login"}).as_object().cloned().unwrap_or_default()
            ))
        );
    }

    #[test]
    fn test_plan_takes_precedence_over_steps() {
        let text = r#"{"plan": ["Create task", "Add subtask"], "steps": [{"tool": "create-task", "args": {}}]}"#;
        assert_eq!(
            parse_response(text),
            ParsedResponse::Plan(Plan {
                steps: vec!["Create task".to_string(), "Add subtask".to_string()],
            })
        );
    }

    #[test]
    fn test_steps_preserve_order() {
        let text = "```\n{\"steps\": [{\"tool\": \"create-task\", \"args\": {\"title\": \"T\"}}, {\"tool\": \"create-subtask\", \"args\": {\"title\": \"S\"}}]}\n```";
        let ParsedResponse::Steps(steps) = parse_response(text) else {
            panic!("expected steps");
        };
        let tools: Vec<&str> = steps.iter().map(|d| d.tool.as_str()).collect();
        assert_eq!(tools, vec!["create-task", "create-subtask"]);
    }

    #[test]
    fn test_malformed_step_makes_whole_response_chat() {
        let text = r#"{"steps": [{"tool": "create-task", "args": {}}, {"tool": "create-subtask"}]}"#;
        assert_eq!(parse_response(text), ParsedResponse::Chat);
    }

    #[test]
    fn test_plan_with_non_string_entry_is_not_a_plan() {
        let text = r#"{"plan": ["one", 2]}"#;
        assert_eq!(parse_response(text), ParsedResponse::Chat);
    }

    #[test]
    fn test_plain_text_is_chat() {
        assert_eq!(parse_response("Hello! How can I help?"), ParsedResponse::Chat);
        assert_eq!(parse_response(""), ParsedResponse::Chat);
        assert_eq!(parse_response("[1, 2, 3]"), ParsedResponse::Chat);
        assert_eq!(parse_response("{\"tool\": \"x\"}"), ParsedResponse::Chat);
    }

    #[test]
    fn test_invalid_fenced_json_is_chat() {
        let text = "```json\n{not json}\n```";
        assert_eq!(parse_response(text), ParsedResponse::Chat);
    }

    #[test]
    fn test_non_json_fence_is_skipped() {
        let text = "```rust\nfn main() {}\n```\n```json\n{\"tool\":\"comment\",\"args\":{\"text\":\"hi\"}}\n```";
        assert!(matches!(parse_response(text), ParsedResponse::Single(d) if d.tool == "comment"));
    }

    #[test]
    fn test_extract_fenced_json_unterminated() {
        assert_eq!(extract_fenced_json("```json\n{\"a\":1}"), None);
        assert_eq!(extract_fenced_json("no fences"), None);
    }

    #[test]
    fn test_single_line_fence_without_separator() {
        let text = "Creating it.\n```json{\"tool\":\"create-task\",\"args\":{\"title\":\"T\"}}```";
        let ParsedResponse::Single(directive) = parse_response(text) else {
            panic!("expected single directive");
        };
        assert_eq!(directive.tool, "create-task");
        assert_eq!(directive.args.get("title"), Some(&json!("T")));
    }

    #[test]
    fn test_fence_tag_followed_by_space() {
        let text = "```json {\"tool\":\"comment\",\"args\":{\"text\":\"hi\"}} ```";
        assert!(matches!(parse_response(text), ParsedResponse::Single(d) if d.tool == "comment"));
    }

    #[test]
    fn test_untagged_single_line_fence() {
        assert_eq!(extract_fenced_json("``` {\"a\":1} ```"), Some("{\"a\":1}"));
        assert_eq!(extract_fenced_json("```JSON\n[1]\n```"), Some("[1]"));
    }

    #[test]
    fn test_single_line_non_json_fence_is_skipped() {
        let text = "```bash echo hi```\n```json{\"tool\":\"comment\",\"args\":{}}```";
        assert_eq!(
            extract_fenced_json(text),
            Some("{\"tool\":\"comment\",\"args\":{}}")
        );
    }
}
