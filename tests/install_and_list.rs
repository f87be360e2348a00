//! Scenario: installing one hook into the user scope writes its file and its
//! Installed Record, then `list`/`show`-equivalent reads see it.

use pacc::core::candidate::Kind;
use pacc::core::config::EngineConfig;
use pacc::core::orchestrator::{Orchestrator, TransactionResult};
use pacc::core::scope::{Scope, ScopeRoot};
use pacc::core::source::LocalDirectoryAdapter;
use pacc::core::store;

#[test]
fn installing_one_hook_from_a_source_directory_commits() {
    let home = tempfile::tempdir().unwrap();
    let source = tempfile::tempdir().unwrap();
    std::fs::write(
        source.path().join("fmt.json"),
        r#"{"name":"fmt","eventTypes":["PreToolUse"],"commands":["ruff check ."]}"#,
    )
    .unwrap();

    let scope = ScopeRoot::resolve(Scope::User, home.path()).unwrap();
    let config = EngineConfig::default();
    let orchestrator = Orchestrator::new(&scope, &config);

    let candidates = LocalDirectoryAdapter::new(source.path()).enumerate().unwrap();
    let result = orchestrator.install(candidates).unwrap();

    match result {
        TransactionResult::Committed { installed, .. } => {
            assert_eq!(installed.len(), 1);
            assert_eq!(installed[0].kind, Kind::Hook);
        }
        other => panic!("expected Committed, got {other:?}"),
    }

    assert!(scope.root.join("hooks/fmt.json").is_file());
    let loaded = store::load(&scope).unwrap();
    assert_eq!(loaded.hashes.get(Kind::Hook, "fmt").map(str::len), Some(64));
}
