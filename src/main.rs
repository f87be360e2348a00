//! `pacc` binary entry point: parses argv, resolves a scope, and dispatches
//! to the engine (`pacc::core`). Thin by design (§1 Out of scope) — all
//! domain logic lives in the library crate.

use clap::Parser;
use colored::Colorize;
use pacc::cli::{Cli, Command};
use pacc::core::candidate::Kind;
use pacc::core::config::EngineConfig;
use pacc::core::doctor;
use pacc::core::error::PaccError;
use pacc::core::orchestrator::{Orchestrator, TransactionResult};
use pacc::core::output::{render_issue, render_transaction_result};
use pacc::core::scope::{Scope, ScopeRoot};
use pacc::core::source::LocalDirectoryAdapter;
use pacc::core::store;

fn main() {
    match run() {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(err) => {
            eprintln!("{} {}", "error:".red().bold(), err);
            std::process::exit(2);
        }
    }
}

fn run() -> Result<i32, PaccError> {
    let cli = Cli::parse();
    let project_root = std::env::current_dir()?;

    let scope_kind = if cli.user { Scope::User } else { Scope::Project };
    let scope = ScopeRoot::resolve(scope_kind, &project_root)?;

    let mut config = EngineConfig::load(&project_root)?;
    config.strict |= cli.strict;
    config.force |= cli.force;

    let orchestrator = Orchestrator::new(&scope, &config);

    match cli.command {
        Command::Install { source } => {
            let candidates = LocalDirectoryAdapter::new(source).enumerate()?;
            reject_plugin_candidates_if_disabled(&candidates)?;
            let result = orchestrator.install(candidates)?;
            render_and_exit(&result)
        }
        Command::Remove { kind, name } => {
            let kind = parse_kind(&kind)?;
            let result = orchestrator.remove(vec![(kind, name)])?;
            render_and_exit(&result)
        }
        Command::List { kind } => {
            run_list(&scope, kind.as_deref())?;
            Ok(0)
        }
        Command::Show { kind, name } => {
            run_show(&scope, &kind, &name)?;
            Ok(0)
        }
        Command::Sync { source } => {
            let candidates = LocalDirectoryAdapter::new(source).enumerate()?;
            reject_plugin_candidates_if_disabled(&candidates)?;
            let result = orchestrator.sync(candidates)?;
            render_and_exit(&result)
        }
        Command::Doctor => {
            let issues = doctor::check(&scope)?;
            if issues.is_empty() {
                println!("{}", "ok: every installed record matches its recorded hash".green());
            } else {
                for issue in &issues {
                    println!("{}", render_issue(issue));
                }
            }
            Ok(if issues.is_empty() { 0 } else { 1 })
        }
    }
}

fn render_and_exit(result: &TransactionResult) -> Result<i32, PaccError> {
    println!("{}", render_transaction_result(result));
    Ok(match result {
        TransactionResult::Committed { .. } | TransactionResult::Recovered { .. } => 0,
        TransactionResult::Aborted { .. } => 1,
    })
}

fn run_list(scope: &ScopeRoot, kind_filter: Option<&str>) -> Result<(), PaccError> {
    let loaded = store::load(scope)?;
    let kinds: Vec<Kind> = match kind_filter {
        Some(raw) => vec![parse_kind(raw)?],
        None => Kind::COMPONENT_KINDS.to_vec(),
    };

    for kind in kinds {
        let Some(bucket) = loaded.preferences.document.get(kind.prefs_key()).and_then(|v| v.as_object()) else {
            continue;
        };
        for name in bucket.keys() {
            let hash = loaded.hashes.get(kind, name).unwrap_or("?");
            println!("{kind}/{name} {hash}");
        }
    }
    Ok(())
}

fn run_show(scope: &ScopeRoot, kind: &str, name: &str) -> Result<(), PaccError> {
    let kind = parse_kind(kind)?;
    let loaded = store::load(scope)?;

    let record = loaded
        .engine_state
        .document
        .get(kind.prefs_key())
        .and_then(|bucket| bucket.get(name));

    match record {
        Some(record) => println!("{}", serde_json::to_string_pretty(record)?),
        None => return Err(PaccError::NotFound(format!("{kind}/{name}"))),
    }
    Ok(())
}

fn reject_plugin_candidates_if_disabled(candidates: &[pacc::core::candidate::Candidate]) -> Result<(), PaccError> {
    let has_plugin = candidates.iter().any(|c| c.kind == Kind::Plugin);
    if has_plugin && !EngineConfig::plugins_enabled() {
        return Err(PaccError::NotFound(
            "plugin support is disabled (set PACC_ENABLE_PLUGINS=1)".to_string(),
        ));
    }
    Ok(())
}

fn parse_kind(raw: &str) -> Result<Kind, PaccError> {
    match raw {
        "hook" => Ok(Kind::Hook),
        "mcp-server" | "mcpServer" => Ok(Kind::McpServer),
        "agent" => Ok(Kind::Agent),
        "command" => Ok(Kind::Command),
        "plugin" => Ok(Kind::Plugin),
        other => Err(PaccError::NotFound(format!("unknown kind {other:?}"))),
    }
}
