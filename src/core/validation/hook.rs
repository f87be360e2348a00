//! Hook validator (§4.2).

use super::{scan_dangerous_command, Validator};
use crate::core::candidate::{Candidate, Kind};
use crate::core::report::{Issue, ValidationReport};
use regex::Regex;

const ALLOWED_EVENT_TYPES: &[&str] = &["PreToolUse", "PostToolUse", "Notification", "Stop"];
const ALLOWED_MATCHER_TYPES: &[&str] = &["exact", "regex", "prefix", "suffix", "contains"];

pub struct HookValidator;

impl HookValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Validator for HookValidator {
    fn can_handle(&self, candidate: &Candidate) -> bool {
        candidate.kind == Kind::Hook
    }

    fn validate(&self, candidate: &Candidate) -> ValidationReport {
        let mut report = ValidationReport::pass();
        let object = match candidate.metadata.as_object() {
            Some(object) => object,
            None => {
                report.push_error(Issue::error("SCHEMA_VIOLATION", "hook body is not an object"));
                return report;
            }
        };

        if !object.get("name").is_some_and(|v| v.is_string()) {
            report.push_error(Issue::error("SCHEMA_VIOLATION", "missing required field `name`"));
        }

        match object.get("eventTypes").and_then(|v| v.as_array()) {
            None => {
                report.push_error(Issue::error(
                    "SCHEMA_VIOLATION",
                    "missing required field `eventTypes`",
                ));
            }
            Some(events) if events.is_empty() => {
                report.push_error(Issue::error("SCHEMA_VIOLATION", "`eventTypes` must not be empty"));
            }
            Some(events) => {
                for event in events {
                    let Some(event) = event.as_str() else {
                        report.push_error(Issue::error("SCHEMA_VIOLATION", "`eventTypes` entries must be strings"));
                        continue;
                    };
                    if !ALLOWED_EVENT_TYPES.contains(&event) {
                        report.push_error(Issue::error(
                            "SCHEMA_VIOLATION",
                            format!("unknown eventType {event:?}"),
                        ));
                    }
                }
            }
        }

        if let Some(matchers) = object.get("matchers").and_then(|v| v.as_array()) {
            for matcher in matchers {
                self.validate_matcher(matcher, &mut report);
            }
        }

        if let Some(commands) = object.get("commands").and_then(|v| v.as_array()) {
            for command in commands.iter().filter_map(|c| c.as_str()) {
                if let Some(pattern) = scan_dangerous_command(command) {
                    report.push_warning(Issue::warning(
                        "DANGEROUS_COMMAND",
                        format!("command contains blocked pattern {pattern:?}"),
                    ));
                }
            }
        }

        for key in object.keys() {
            if !["name", "eventTypes", "matchers", "commands"].contains(&key.as_str()) {
                report.push_warning(Issue::warning("UNKNOWN_FIELD", format!("unrecognized field {key:?}")));
            }
        }

        report
    }
}

impl HookValidator {
    fn validate_matcher(&self, matcher: &serde_json::Value, report: &mut ValidationReport) {
        let Some(object) = matcher.as_object() else {
            report.push_error(Issue::error("SCHEMA_VIOLATION", "matcher must be an object"));
            return;
        };
        match object.get("type").and_then(|v| v.as_str()) {
            None => report.push_error(Issue::error("SCHEMA_VIOLATION", "matcher missing `type`")),
            Some(kind) if !ALLOWED_MATCHER_TYPES.contains(&kind) => {
                report.push_error(Issue::error("SCHEMA_VIOLATION", format!("unknown matcher type {kind:?}")));
            }
            Some("regex") => {
                if let Some(pattern) = object.get("pattern").and_then(|v| v.as_str()) {
                    if Regex::new(pattern).is_err() {
                        report.push_error(Issue::error(
                            "SCHEMA_VIOLATION",
                            format!("invalid regex pattern {pattern:?}"),
                        ));
                    }
                } else {
                    report.push_error(Issue::error("SCHEMA_VIOLATION", "regex matcher missing `pattern`"));
                }
            }
            Some(_) => {
                if object.get("pattern").and_then(|v| v.as_str()).is_none() {
                    report.push_error(Issue::error("SCHEMA_VIOLATION", "matcher missing `pattern`"));
                }
            }
        }
    }
}
