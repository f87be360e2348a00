//! Command validator (§4.2).
//!
//! The metadata block is optional — a historical asymmetry with Agent that
//! the spec preserves rather than fixes (see DESIGN.md).

use super::detect::parse_front_matter;
use super::Validator;
use crate::core::candidate::{Candidate, Kind};
use crate::core::path_kernel::validate_name;
use crate::core::report::{Issue, ValidationReport};

pub struct CommandValidator;

impl CommandValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Validator for CommandValidator {
    fn can_handle(&self, candidate: &Candidate) -> bool {
        candidate.kind == Kind::Command
    }

    fn validate(&self, candidate: &Candidate) -> ValidationReport {
        let mut report = ValidationReport::pass();
        let text = match std::str::from_utf8(&candidate.content) {
            Ok(text) => text,
            Err(_) => {
                report.push_error(Issue::error("SCHEMA_VIOLATION", "command body is not valid UTF-8"));
                return report;
            }
        };

        let effective_name = match parse_front_matter(text) {
            Some(front_matter) => front_matter
                .fields
                .get("name")
                .cloned()
                .unwrap_or_else(|| candidate.logical_name.clone()),
            None => candidate.logical_name.clone(),
        };

        if let Err(err) = validate_name(Kind::Command, &effective_name) {
            report.push_error(Issue::error("NAME_RESERVED", err.to_string()));
        }

        report
    }
}
