//! Validation pipeline (C2): per-kind validators producing a `ValidationReport`.

mod agent;
mod command;
pub mod detect;
mod hook;
mod mcp_server;
mod plugin;

use crate::core::candidate::{Candidate, Kind};
use crate::core::report::ValidationReport;

pub use detect::detect_kind;

/// The capability set a per-kind validator implements. Stateless: construction
/// takes no scope, only the immutable regex/keyword tables it needs.
pub trait Validator: Send + Sync {
    fn can_handle(&self, candidate: &Candidate) -> bool;
    fn validate(&self, candidate: &Candidate) -> ValidationReport;
}

/// Owns the registry of validators and runs a candidate through the one
/// that claims its `Kind`. Regex tables inside each validator are immutable
/// constants built once at construction (§9: no process-wide mutable state).
pub struct ValidationPipeline {
    validators: Vec<Box<dyn Validator>>,
    strict: bool,
}

impl ValidationPipeline {
    pub fn new(strict: bool) -> Self {
        Self {
            validators: vec![
                Box::new(hook::HookValidator::new()),
                Box::new(mcp_server::McpServerValidator::new()),
                Box::new(agent::AgentValidator::new()),
                Box::new(command::CommandValidator::new()),
                Box::new(plugin::PluginValidator::new()),
            ],
            strict,
        }
    }

    pub fn validate(&self, candidate: &Candidate) -> ValidationReport {
        let mut report = match self.validators.iter().find(|v| v.can_handle(candidate)) {
            Some(validator) => validator.validate(candidate),
            None => {
                let mut report = ValidationReport::pass();
                report.push_error(crate::core::report::Issue::error(
                    "UNDETECTABLE_KIND",
                    format!("no validator registered for kind {}", candidate.kind),
                ));
                report
            }
        };
        if self.strict {
            report.promote_warnings_to_errors();
        }
        report
    }

    /// Validate an independent batch. Hashing/parsing is pure, so the host
    /// MAY run these in parallel (§5); sequential here is the default.
    pub fn validate_all(&self, candidates: &[Candidate]) -> Vec<ValidationReport> {
        candidates.iter().map(|c| self.validate(c)).collect()
    }
}

/// Helper shared by validators: known dangerous command substrings (§4.2).
pub(crate) const DANGEROUS_COMMAND_PATTERNS: &[&str] = &[
    "rm -rf /",
    "rm -rf ~",
    ":(){:|:&};:",
    "mkfs.",
    "dd if=/dev/zero",
    "> /dev/sda",
    "curl | sh",
    "wget | sh",
];

pub(crate) fn scan_dangerous_command(command: &str) -> Option<&'static str> {
    DANGEROUS_COMMAND_PATTERNS
        .iter()
        .find(|pattern| command.contains(**pattern))
        .copied()
}
