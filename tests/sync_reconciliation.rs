//! Scenario: `sync` reconciles a scope against a declared set — installing
//! what's missing, removing what's no longer declared, and leaving matching
//! entries untouched.

use pacc::core::candidate::{Candidate, Kind};
use pacc::core::config::EngineConfig;
use pacc::core::orchestrator::{Orchestrator, TransactionResult};
use pacc::core::scope::{Scope, ScopeRoot};
use pacc::core::source::content_hash;
use pacc::core::store;
use serde_json::json;

fn hook(name: &str, body: serde_json::Value) -> Candidate {
    let content = serde_json::to_vec(&body).unwrap();
    Candidate {
        source_path: format!("{name}.json").into(),
        kind: Kind::Hook,
        logical_name: name.to_string(),
        declared_version: None,
        content_hash: content_hash(&content),
        content,
        metadata: body,
    }
}

#[test]
fn sync_installs_missing_and_removes_undeclared_entries() {
    let home = tempfile::tempdir().unwrap();
    let scope = ScopeRoot::resolve(Scope::Project, home.path()).unwrap();
    let config = EngineConfig::default();
    let orchestrator = Orchestrator::new(&scope, &config);

    orchestrator
        .install(vec![
            hook("fmt", json!({"name": "fmt", "eventTypes": ["PreToolUse"]})),
            hook("legacy", json!({"name": "legacy", "eventTypes": ["Stop"]})),
        ])
        .unwrap();

    // Team declares fmt (unchanged) and lint (new); legacy is dropped.
    let declared = vec![
        hook("fmt", json!({"name": "fmt", "eventTypes": ["PreToolUse"]})),
        hook("lint", json!({"name": "lint", "eventTypes": ["PreToolUse"]})),
    ];

    let result = orchestrator.sync(declared).unwrap();
    assert!(matches!(result, TransactionResult::Committed { .. }));

    let loaded = store::load(&scope).unwrap();
    let hooks = loaded.preferences.document["hooks"].as_object().unwrap();
    assert!(hooks.contains_key("fmt"));
    assert!(hooks.contains_key("lint"));
    assert!(!hooks.contains_key("legacy"));
    assert!(!scope.root.join("hooks/legacy.json").exists());
    assert!(scope.root.join("hooks/lint.json").exists());
}

#[test]
fn sync_with_nothing_to_change_is_a_committed_noop() {
    let home = tempfile::tempdir().unwrap();
    let scope = ScopeRoot::resolve(Scope::Project, home.path()).unwrap();
    let config = EngineConfig::default();
    let orchestrator = Orchestrator::new(&scope, &config);

    let declared = vec![hook("fmt", json!({"name": "fmt", "eventTypes": ["PreToolUse"]}))];
    orchestrator.sync(declared.clone()).unwrap();

    let result = orchestrator.sync(declared).unwrap();
    match result {
        TransactionResult::Committed { installed, updated, removed } => {
            assert!(installed.is_empty());
            assert!(updated.is_empty());
            assert!(removed.is_empty());
        }
        other => panic!("expected Committed, got {other:?}"),
    }
}
