//! McpServer validator (§4.2).

use super::Validator;
use crate::core::candidate::{Candidate, Kind};
use crate::core::report::{Issue, ValidationReport};

pub struct McpServerValidator;

impl McpServerValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Validator for McpServerValidator {
    fn can_handle(&self, candidate: &Candidate) -> bool {
        candidate.kind == Kind::McpServer
    }

    fn validate(&self, candidate: &Candidate) -> ValidationReport {
        let mut report = ValidationReport::pass();
        let Some(servers) = candidate
            .metadata
            .as_object()
            .and_then(|o| o.get("mcpServers"))
            .and_then(|v| v.as_object())
        else {
            report.push_error(Issue::error("SCHEMA_VIOLATION", "missing `mcpServers` mapping"));
            return report;
        };

        for (name, entry) in servers {
            let Some(entry) = entry.as_object() else {
                report.push_error(Issue::error(
                    "SCHEMA_VIOLATION",
                    format!("server {name:?} body is not an object"),
                ));
                continue;
            };

            let command = entry.get("command").and_then(|v| v.as_str());
            if command.is_none() {
                report.push_error(Issue::error(
                    "SCHEMA_VIOLATION",
                    format!("server {name:?} missing required field `command`"),
                ));
            }

            if let Some(args) = entry.get("args") {
                if !args.is_array() {
                    report.push_error(Issue::error(
                        "SCHEMA_VIOLATION",
                        format!("server {name:?} field `args` must be an array"),
                    ));
                }
            }
            if let Some(env) = entry.get("env") {
                if !env.is_object() {
                    report.push_error(Issue::error(
                        "SCHEMA_VIOLATION",
                        format!("server {name:?} field `env` must be an object"),
                    ));
                }
            }
            if let Some(timeout) = entry.get("timeout") {
                let positive = timeout.as_u64().is_some_and(|t| t > 0);
                if !positive {
                    report.push_error(Issue::error(
                        "SCHEMA_VIOLATION",
                        format!("server {name:?} field `timeout` must be a positive integer"),
                    ));
                }
            }

            if let Some(command) = command {
                let looks_like_path = command.contains('/') || command.starts_with('.');
                if looks_like_path && !std::path::Path::new(command).exists() {
                    report.push_warning(Issue::warning(
                        "INVALID_REFERENCE",
                        format!("server {name:?} command {command:?} does not exist yet"),
                    ));
                }
            }

            for key in entry.keys() {
                if !["command", "args", "env", "timeout", "cwd"].contains(&key.as_str()) {
                    report.push_warning(Issue::warning(
                        "UNKNOWN_FIELD",
                        format!("server {name:?} has unrecognized field {key:?}"),
                    ));
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidate(metadata: serde_json::Value) -> Candidate {
        Candidate {
            source_path: "servers.json".into(),
            kind: Kind::McpServer,
            logical_name: "fs".to_string(),
            declared_version: None,
            content_hash: "x".to_string(),
            content: vec![],
            metadata,
        }
    }

    #[test]
    fn valid_server_passes() {
        let validator = McpServerValidator::new();
        let report = validator.validate(&candidate(json!({
            "mcpServers": { "fs": { "command": "mcp-fs", "timeout": 30 } }
        })));
        assert!(report.ok);
    }

    #[test]
    fn missing_command_fails() {
        let validator = McpServerValidator::new();
        let report = validator.validate(&candidate(json!({
            "mcpServers": { "fs": { "args": ["--port", "8080"] } }
        })));
        assert!(!report.ok);
    }

    #[test]
    fn missing_binary_is_warning() {
        let validator = McpServerValidator::new();
        let report = validator.validate(&candidate(json!({
            "mcpServers": { "fs": { "command": "/opt/nonexistent/mcp-fs" } }
        })));
        assert!(report.ok);
        assert_eq!(report.warnings[0].code, "INVALID_REFERENCE");
    }
}
