//! Agent validator (§4.2): Markdown with a required metadata block.

use super::detect::parse_front_matter;
use super::Validator;
use crate::core::candidate::{Candidate, Kind};
use crate::core::report::{Issue, ValidationReport};

const KNOWN_FIELDS: &[&str] = &["name", "description", "tools"];

pub struct AgentValidator;

impl AgentValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Validator for AgentValidator {
    fn can_handle(&self, candidate: &Candidate) -> bool {
        candidate.kind == Kind::Agent
    }

    fn validate(&self, candidate: &Candidate) -> ValidationReport {
        let mut report = ValidationReport::pass();
        let text = match std::str::from_utf8(&candidate.content) {
            Ok(text) => text,
            Err(_) => {
                report.push_error(Issue::error("SCHEMA_VIOLATION", "agent body is not valid UTF-8"));
                return report;
            }
        };

        let Some(front_matter) = parse_front_matter(text) else {
            report.push_error(Issue::error(
                "SCHEMA_VIOLATION",
                "agent requires a leading metadata block",
            ));
            return report;
        };

        if !front_matter.fields.contains_key("name") {
            report.push_error(Issue::error("SCHEMA_VIOLATION", "agent metadata missing `name`"));
        }
        if !front_matter.fields.contains_key("description") {
            report.push_error(Issue::error("SCHEMA_VIOLATION", "agent metadata missing `description`"));
        }

        for key in front_matter.fields.keys() {
            if !KNOWN_FIELDS.contains(&key.as_str()) {
                report.push_warning(Issue::warning("UNKNOWN_FIELD", format!("unrecognized field {key:?}")));
            }
        }

        report
    }
}
