//! Structural auto-detection (§4.2): classify a source file by content, not extension.

use crate::core::candidate::Kind;
use crate::core::error::ValidationError;
use serde_json::Value as JsonValue;

/// Leading fenced metadata block of a Markdown file, e.g.:
/// ```text
/// ---
/// name: foo
/// description: bar
/// ---
/// ```
pub struct FrontMatter {
    pub fields: std::collections::BTreeMap<String, String>,
    pub body_offset: usize,
}

/// Parse the leading `---`-delimited block, if any. Returns `None` when the
/// file has no such block at all (not an error — Command's block is optional).
pub fn parse_front_matter(text: &str) -> Option<FrontMatter> {
    let mut lines = text.lines();
    if lines.next()?.trim() != "---" {
        return None;
    }
    let mut fields = std::collections::BTreeMap::new();
    let mut consumed = "---\n".len();
    for line in lines {
        consumed += line.len() + 1;
        let trimmed = line.trim();
        if trimmed == "---" {
            return Some(FrontMatter {
                fields,
                body_offset: consumed,
            });
        }
        if let Some((key, value)) = trimmed.split_once(':') {
            fields.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    None
}

/// Classify raw bytes into a `Kind`, or fail with `UndetectableKind`.
pub fn detect_kind(raw: &[u8]) -> Result<Kind, ValidationError> {
    if let Ok(text) = std::str::from_utf8(raw) {
        if let Ok(json) = serde_json::from_str::<JsonValue>(text) {
            return detect_json_kind(&json);
        }
        if text.trim_start().starts_with("---") {
            if let Some(front_matter) = parse_front_matter(text) {
                return if front_matter.fields.contains_key("name")
                    && front_matter.fields.contains_key("description")
                {
                    Ok(Kind::Agent)
                } else {
                    Ok(Kind::Command)
                };
            }
        }
        // Markdown with no front matter at all is still a Command candidate
        // (§4.2: the metadata block is optional for Command).
        if text.trim_start().starts_with('#') || !text.trim().is_empty() {
            return Ok(Kind::Command);
        }
    }
    Err(ValidationError::UndetectableKind(
        "could not classify candidate content".to_string(),
    ))
}

fn detect_json_kind(value: &JsonValue) -> Result<Kind, ValidationError> {
    let Some(object) = value.as_object() else {
        return Err(ValidationError::UndetectableKind(
            "JSON root is not an object".to_string(),
        ));
    };
    if object.contains_key("hooks") || object.contains_key("eventTypes") {
        return Ok(Kind::Hook);
    }
    if object.contains_key("mcpServers") {
        return Ok(Kind::McpServer);
    }
    if object.contains_key("components") || object.contains_key("plugin") {
        return Ok(Kind::Plugin);
    }
    Err(ValidationError::UndetectableKind(
        "JSON object matched no known schema".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_hook_by_event_types() {
        let raw = br#"{"name":"fmt","eventTypes":["PreToolUse"]}"#;
        assert_eq!(detect_kind(raw).unwrap(), Kind::Hook);
    }

    #[test]
    fn detects_mcp_server_by_mapping() {
        let raw = br#"{"mcpServers":{"fs":{"command":"mcp-fs"}}}"#;
        assert_eq!(detect_kind(raw).unwrap(), Kind::McpServer);
    }

    #[test]
    fn detects_agent_by_front_matter_with_description() {
        let raw = b"---\nname: reviewer\ndescription: reviews PRs\n---\nBody.";
        assert_eq!(detect_kind(raw).unwrap(), Kind::Agent);
    }

    #[test]
    fn markdown_without_description_is_command() {
        let raw = b"---\nname: fmt\n---\nRun the formatter.";
        assert_eq!(detect_kind(raw).unwrap(), Kind::Command);
    }

    #[test]
    fn markdown_without_front_matter_is_command() {
        let raw = b"# Format\nRuns `ruff check`.";
        assert_eq!(detect_kind(raw).unwrap(), Kind::Command);
    }

    #[test]
    fn ambiguous_json_object_is_undetectable() {
        let raw = br#"{"foo": "bar"}"#;
        assert!(detect_kind(raw).is_err());
    }
}
