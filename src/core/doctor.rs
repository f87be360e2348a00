//! Integrity check (§11 of SPEC_FULL.md): re-verifies invariant 1 — every
//! Installed Record's file exists and hashes to its recorded `content_hash`
//! — without mutating anything. Read-only, unlike the orchestrator.

use crate::core::candidate::Kind;
use crate::core::error::PaccError;
use crate::core::report::Issue;
use crate::core::scope::ScopeRoot;
use crate::core::source::{content_hash, normalize_content};
use crate::core::store;

/// Walk every recorded extension and confirm its on-disk file still hashes
/// to the sidecar's recorded `content_hash`. Returns one `Issue` per
/// violation; an empty result means the scope is internally consistent.
pub fn check(scope: &ScopeRoot) -> Result<Vec<Issue>, PaccError> {
    let loaded = store::load(scope)?;
    let mut issues = Vec::new();

    for kind in Kind::COMPONENT_KINDS {
        let Some(bucket) = loaded.engine_state.document.get(kind.prefs_key()).and_then(|v| v.as_object()) else {
            continue;
        };
        for logical_name in bucket.keys() {
            let Some(expected_hash) = loaded.hashes.get(kind, logical_name) else {
                issues.push(Issue::error(
                    "HASH_MISMATCH",
                    format!("{kind} {logical_name:?} has no recorded content_hash"),
                ));
                continue;
            };

            let extension = match kind {
                Kind::Hook | Kind::McpServer | Kind::Plugin => "json",
                Kind::Agent | Kind::Command => "md",
            };
            let relative = format!("{}/{}.{}", kind.dir_name(), logical_name, extension);
            let absolute = scope.root.join(&relative);

            match std::fs::read(&absolute) {
                Ok(bytes) => {
                    let actual = content_hash(&normalize_content(&bytes));
                    if actual != expected_hash {
                        issues.push(
                            Issue::error(
                                "HASH_MISMATCH",
                                format!("{relative} hashes to {actual}, expected {expected_hash}"),
                            )
                            .with_path(relative),
                        );
                    }
                }
                Err(_) => {
                    issues.push(Issue::error("HASH_MISMATCH", format!("missing file for {kind} {logical_name:?}")).with_path(relative));
                }
            }
        }
    }

    Ok(issues)
}
