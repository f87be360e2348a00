//! `Issue` and `ValidationReport`: the currency validators speak (§3, §7).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// One diagnostic. `code` is stable across releases; `message` is not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub code: String,
    pub path: Option<String>,
    pub line: Option<u32>,
    pub message: String,
    pub severity: Severity,
}

impl Issue {
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            path: None,
            line: None,
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn warning(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            path: None,
            line: None,
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Output of validating one `Candidate`. Pure — produced by reading, never by
/// writing. Validators accumulate into this; the pipeline decides pass/fail.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub ok: bool,
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
}

impl ValidationReport {
    pub fn pass() -> Self {
        Self {
            ok: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn push_error(&mut self, issue: Issue) {
        self.ok = false;
        self.errors.push(issue);
    }

    pub fn push_warning(&mut self, issue: Issue) {
        self.warnings.push(issue);
    }

    /// Fold another report's issues into this one.
    pub fn merge(&mut self, other: ValidationReport) {
        self.ok &= other.ok;
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// `strict` mode (§4.2, §7): warnings become errors.
    pub fn promote_warnings_to_errors(&mut self) {
        if self.warnings.is_empty() {
            return;
        }
        self.ok = false;
        for mut issue in std::mem::take(&mut self.warnings) {
            issue.severity = Severity::Error;
            self.errors.push(issue);
        }
    }
}
