//! Plugin validator (§4.2).
//!
//! A Plugin candidate's `metadata` is its parsed manifest. Component
//! extensions named by the manifest are validated separately, under their
//! own `Kind`, by the source adapter re-submitting them to the pipeline
//! (§4.6) — this validator only checks the manifest shape itself.

use super::Validator;
use crate::core::candidate::{Candidate, Kind};
use crate::core::report::{Issue, ValidationReport};

const COMPONENT_KIND_NAMES: &[&str] = &["hook", "mcpServer", "agent", "command"];

pub struct PluginValidator;

impl PluginValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Validator for PluginValidator {
    fn can_handle(&self, candidate: &Candidate) -> bool {
        candidate.kind == Kind::Plugin
    }

    fn validate(&self, candidate: &Candidate) -> ValidationReport {
        let mut report = ValidationReport::pass();
        let Some(manifest) = candidate.metadata.as_object() else {
            report.push_error(Issue::error("SCHEMA_VIOLATION", "plugin manifest is not an object"));
            return report;
        };

        if !manifest.get("name").is_some_and(|v| v.is_string()) {
            report.push_error(Issue::error("SCHEMA_VIOLATION", "plugin manifest missing `name`"));
        }

        match manifest.get("components").and_then(|v| v.as_array()) {
            None => {
                report.push_error(Issue::error(
                    "SCHEMA_VIOLATION",
                    "plugin manifest missing `components` array",
                ));
            }
            Some(components) if components.is_empty() => {
                report.push_warning(Issue::warning("UNKNOWN_FIELD", "plugin declares zero components"));
            }
            Some(components) => {
                for component in components {
                    self.validate_component_entry(component, &mut report);
                }
            }
        }

        report
    }
}

impl PluginValidator {
    fn validate_component_entry(&self, entry: &serde_json::Value, report: &mut ValidationReport) {
        let Some(object) = entry.as_object() else {
            report.push_error(Issue::error("SCHEMA_VIOLATION", "component entry must be an object"));
            return;
        };
        match object.get("kind").and_then(|v| v.as_str()) {
            None => report.push_error(Issue::error("SCHEMA_VIOLATION", "component entry missing `kind`")),
            Some(kind) if !COMPONENT_KIND_NAMES.contains(&kind) => {
                report.push_error(Issue::error(
                    "SCHEMA_VIOLATION",
                    format!("component entry has unknown kind {kind:?}"),
                ));
            }
            Some(_) => {}
        }
        if object.get("path").and_then(|v| v.as_str()).is_none() {
            report.push_error(Issue::error("SCHEMA_VIOLATION", "component entry missing `path`"));
        }
    }
}
