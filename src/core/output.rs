//! Compact output rendering helpers for CLI surfaces.
//!
//! Keeps command result output bounded and readable while preserving signal.
//! The engine itself never renders (§1 Non-goals: "does not render
//! human-friendly diagnostics"); these helpers exist for the `pacc` binary's
//! CLI collaborator to format the structured results the engine returns.

use crate::core::orchestrator::{RecoveryAction, TransactionResult};
use crate::core::report::{Issue, Severity};
use colored::Colorize;

/// Render one diagnostic as a single colored line.
pub fn render_issue(issue: &Issue) -> String {
    let label = match issue.severity {
        Severity::Error => "error".red().bold(),
        Severity::Warning => "warning".yellow().bold(),
    };
    let location = issue.path.as_deref().unwrap_or("");
    if location.is_empty() {
        format!("{label} [{}]: {}", issue.code, issue.message)
    } else {
        format!("{label} [{}] {location}: {}", issue.code, issue.message)
    }
}

/// Render a `TransactionResult` as a short human-readable summary.
pub fn render_transaction_result(result: &TransactionResult) -> String {
    match result {
        TransactionResult::Committed { installed, updated, removed } => {
            format!(
                "{} installed={} updated={} removed={}",
                "committed".green().bold(),
                installed.len(),
                updated.len(),
                removed.len()
            )
        }
        TransactionResult::Aborted { phase, reason, diagnostics } => {
            let mut line = format!("{} during {phase}: {reason}", "aborted".red().bold());
            if !diagnostics.is_empty() {
                line.push_str(" | ");
                line.push_str(&preview_messages(
                    &diagnostics.iter().map(render_issue).collect::<Vec<_>>(),
                    5,
                    120,
                ));
            }
            line
        }
        TransactionResult::Recovered { prior_txid, action } => {
            let action_label = match action {
                RecoveryAction::RolledBack => "rolled back",
                RecoveryAction::RolledForward => "rolled forward",
            };
            format!("{} transaction {prior_txid} ({action_label})", "recovered".cyan().bold())
        }
    }
}

/// Collapse newlines/extra whitespace and bound length for terminal display.
pub fn compact_line(input: &str, max_chars: usize) -> String {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    let preview: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", preview)
    } else {
        preview
    }
}

/// Render up to `max_items` messages with compact formatting.
pub fn preview_messages(messages: &[String], max_items: usize, max_chars: usize) -> String {
    if messages.is_empty() {
        return String::new();
    }
    let shown = messages
        .iter()
        .take(max_items)
        .map(|m| compact_line(m, max_chars))
        .collect::<Vec<_>>()
        .join(" | ");
    if messages.len() > max_items {
        format!("{} (+{} more)", shown, messages.len() - max_items)
    } else {
        shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_line_truncates_long_input() {
        let rendered = compact_line("one two three four five", 11);
        assert_eq!(rendered, "one two...");
    }

    #[test]
    fn render_issue_includes_code_and_path() {
        let issue = Issue::error("SCHEMA_VIOLATION", "missing name").with_path("fmt.json");
        let rendered = render_issue(&issue);
        assert!(rendered.contains("SCHEMA_VIOLATION"));
        assert!(rendered.contains("fmt.json"));
    }

    #[test]
    fn render_committed_result_counts_records() {
        let result = TransactionResult::Committed {
            installed: vec![],
            updated: vec![],
            removed: vec!["fmt".to_string()],
        };
        let rendered = render_transaction_result(&result);
        assert!(rendered.contains("removed=1"));
    }
}
