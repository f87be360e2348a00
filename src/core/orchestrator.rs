//! Transaction orchestrator (C5): plans a sequence of reversible steps,
//! executes them under a lock with a journal, commits or rolls back
//! atomically.

use crate::core::backup::{BackupEntry, BackupStore};
use crate::core::candidate::{Candidate, InstalledRecord, Kind, Origin};
use crate::core::config::EngineConfig;
use crate::core::error::{ConflictError, PaccError};
use crate::core::lock::ScopeLock;
use crate::core::path_kernel;
use crate::core::report::Issue;
use crate::core::scope::ScopeRoot;
use crate::core::store::{self, EngineState, LoadedStore, Preferences};
use crate::core::time::{new_transaction_id, now_epoch_z};
use crate::core::validation::ValidationPipeline;
use serde_json::{Map, Value as JsonValue};
use std::path::{Path, PathBuf};

/// One of the ten reversible actions a plan sequences (§4.5). Several carry
/// the data needed to both execute and (if aborted) describe what happened;
/// the actual reversal is captured in the journal's `reversible_action`.
#[derive(Debug, Clone)]
pub enum StepKind {
    AcquireLock,
    SnapshotDocument { label: &'static str },
    SnapshotFile { rel: PathBuf },
    EnsureDirectory { rel: PathBuf },
    CopyFile { rel_dst: PathBuf, expected_hash: String },
    RemoveFile { rel: PathBuf },
    StageDocumentPatch { label: &'static str },
    CommitDocuments,
    RunPostValidation,
    ReleaseLock,
}

#[derive(Debug, Clone)]
pub struct Step {
    pub kind: StepKind,
}

/// An ordered, finite plan. `fingerprint` is the hash of the scope's engine
/// state document at planning time, used only for diagnostics.
pub struct Plan {
    pub steps: Vec<Step>,
    pub candidates: Vec<Candidate>,
    pub removals: Vec<(Kind, String)>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct JournalEntry {
    pub step_index: usize,
    pub description: String,
    pub reversible_action: Option<BackupEntry>,
    pub completed: bool,
}

/// Persisted under `engine/journal/<txid>/journal.json`, rewritten wholesale
/// after every step (simpler than append-only, still flushed before the
/// step's side effect per §4.5).
struct Journal {
    path: PathBuf,
    entries: Vec<JournalEntry>,
}

impl Journal {
    fn create(scope: &ScopeRoot, txid: &str) -> Result<Self, PaccError> {
        let dir = scope.journal_dir(txid);
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            path: dir.join("journal.json"),
            entries: Vec::new(),
        })
    }

    fn load(path: &std::path::Path) -> Result<Self, PaccError> {
        let bytes = std::fs::read(path)?;
        let entries: Vec<JournalEntry> = serde_json::from_slice(&bytes)?;
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Append a not-yet-completed entry and flush before the caller performs
    /// the entry's side effect.
    fn begin_step(&mut self, index: usize, description: String) -> Result<(), PaccError> {
        self.entries.push(JournalEntry {
            step_index: index,
            description,
            reversible_action: None,
            completed: false,
        });
        self.flush()
    }

    fn complete_step(&mut self, reversible_action: Option<BackupEntry>) -> Result<(), PaccError> {
        if let Some(entry) = self.entries.last_mut() {
            entry.reversible_action = reversible_action;
            entry.completed = true;
        }
        self.flush()
    }

    fn flush(&self) -> Result<(), PaccError> {
        let bytes = serde_json::to_vec_pretty(&self.entries)?;
        std::fs::write(&self.path, bytes)?;
        Ok(())
    }

    fn commit_documents_completed(&self) -> bool {
        self.entries
            .iter()
            .any(|e| e.completed && e.description == "CommitDocuments")
    }

    fn reversible_actions(&self) -> impl DoubleEndedIterator<Item = &BackupEntry> {
        self.entries.iter().filter_map(|e| e.reversible_action.as_ref())
    }
}

/// Outcome of a transaction (§6).
#[derive(Debug, Clone)]
pub enum TransactionResult {
    Committed {
        installed: Vec<InstalledRecord>,
        updated: Vec<InstalledRecord>,
        removed: Vec<String>,
    },
    Aborted {
        phase: &'static str,
        reason: String,
        diagnostics: Vec<Issue>,
    },
    Recovered {
        prior_txid: String,
        action: RecoveryAction,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    RolledBack,
    RolledForward,
}

/// Drives installs, removals, and team-sync for one scope.
pub struct Orchestrator<'a> {
    pub scope: &'a ScopeRoot,
    pub config: &'a EngineConfig,
}

impl<'a> Orchestrator<'a> {
    pub fn new(scope: &'a ScopeRoot, config: &'a EngineConfig) -> Self {
        Self { scope, config }
    }

    /// Discover and replay any journal left by a prior invocation that
    /// crashed or was interrupted. Must run before planning a new
    /// transaction so a stale lock never blocks a fresh one unnecessarily.
    pub fn recover(&self) -> Result<Vec<TransactionResult>, PaccError> {
        let journal_root = self.scope.root.join("engine/journal");
        if !journal_root.is_dir() {
            return Ok(Vec::new());
        }
        let mut results = Vec::new();
        for entry in std::fs::read_dir(&journal_root)? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            let txid = entry.file_name().to_string_lossy().to_string();
            let journal_path = entry.path().join("journal.json");
            if !journal_path.is_file() {
                std::fs::remove_dir_all(entry.path())?;
                continue;
            }

            let _lock = ScopeLock::acquire(&self.scope.lock_path(), self.config.lock_timeout())?;
            let journal = Journal::load(&journal_path)?;
            let backups = BackupStore::new(self.scope, &txid)?;

            let action = if journal.commit_documents_completed() {
                RecoveryAction::RolledForward
            } else {
                backups.restore_all(journal.reversible_actions())?;
                RecoveryAction::RolledBack
            };

            backups.gc()?;
            std::fs::remove_dir_all(entry.path())?;
            results.push(TransactionResult::Recovered {
                prior_txid: txid,
                action,
            });
        }
        Ok(results)
    }

    /// Install a validated set of candidates into this scope.
    pub fn install(&self, candidates: Vec<Candidate>) -> Result<TransactionResult, PaccError> {
        self.recover()?;

        let pipeline = ValidationPipeline::new(self.config.strict);
        let mut diagnostics = Vec::new();
        for candidate in &candidates {
            let report = pipeline.validate(candidate);
            diagnostics.extend(report.errors.iter().cloned());
            if !report.ok {
                return Ok(TransactionResult::Aborted {
                    phase: "validate",
                    reason: "one or more candidates failed validation".to_string(),
                    diagnostics,
                });
            }
        }

        let txid = new_transaction_id();
        let _lock = ScopeLock::acquire(&self.scope.lock_path(), self.config.lock_timeout())?;
        let loaded = store::load(self.scope)?;

        if let Some(conflict) = self.find_conflict(&candidates, &loaded) {
            return Ok(TransactionResult::Aborted {
                phase: "plan",
                reason: conflict.to_string(),
                diagnostics: Vec::new(),
            });
        }

        let mut journal = Journal::create(self.scope, &txid)?;
        let backups = BackupStore::new(self.scope, &txid)?;

        let outcome = self.execute_install(&candidates, loaded, &mut journal, &backups);

        match outcome {
            Ok(result) => {
                backups.gc()?;
                std::fs::remove_dir_all(self.scope.journal_dir(&txid))?;
                Ok(result)
            }
            Err(err) => {
                backups.restore_all(journal.reversible_actions())?;
                backups.gc()?;
                std::fs::remove_dir_all(self.scope.journal_dir(&txid))?;
                Ok(TransactionResult::Aborted {
                    phase: "execute",
                    reason: format!("[{}] {err}", err.code()),
                    diagnostics: Vec::new(),
                })
            }
        }
    }

    /// Snapshot the pre-image of all three documents before `stage`/`commit`
    /// run. `commit` performs three independent sequential renames with no
    /// cross-file atomicity of its own; these entries are what let a crash
    /// between those renames be rolled back to a consistent prior state.
    fn snapshot_document_preimages(
        &self,
        journal: &mut Journal,
        backups: &BackupStore,
        step_index: &mut usize,
    ) -> Result<(), PaccError> {
        for (absolute, logical) in [
            (self.scope.preferences_path(), "preferences.json"),
            (self.scope.engine_state_path(), "engine-state.json"),
            (self.scope.hashes_path(), "engine-state.hashes.json"),
        ] {
            let bytes = match std::fs::read(&absolute) {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
                Err(e) => return Err(e.into()),
            };
            *step_index += 1;
            journal.begin_step(*step_index, format!("SnapshotDocument({logical})"))?;
            let snapshot = backups.snapshot_bytes(Path::new(logical), bytes);
            journal.complete_step(Some(snapshot))?;
        }
        Ok(())
    }

    fn find_conflict(&self, candidates: &[Candidate], loaded: &LoadedStore) -> Option<ConflictError> {
        for candidate in candidates {
            let existing_hash = loaded.hashes.get(candidate.kind, &candidate.logical_name);
            if let Some(existing_hash) = existing_hash {
                if existing_hash != candidate.content_hash && !self.config.force {
                    return Some(ConflictError::ConflictExists {
                        logical_name: candidate.logical_name.clone(),
                    });
                }
            }
        }
        None
    }

    fn execute_install(
        &self,
        candidates: &[Candidate],
        loaded: LoadedStore,
        journal: &mut Journal,
        backups: &BackupStore,
    ) -> Result<TransactionResult, PaccError> {
        let LoadedStore {
            mut preferences,
            mut engine_state,
            mut hashes,
        } = loaded;

        let mut installed = Vec::new();
        let mut updated = Vec::new();
        let mut step_index = 0usize;
        // A Plugin candidate owns no install path of its own (§6 schema has
        // no `plugins` bucket); it only contributes an `enabledPlugins`
        // entry and tags the components that follow it in the same batch
        // with `origin: Plugin` (source adapters emit plugin candidates
        // before their components, see `source::LocalDirectoryAdapter`).
        let mut current_plugin: Option<String> = None;

        for candidate in candidates {
            path_kernel::validate_name(candidate.kind, &candidate.logical_name)?;

            if candidate.kind == Kind::Plugin {
                current_plugin = Some(candidate.logical_name.clone());
                if let Some(plugins) = preferences.document.get_mut("enabledPlugins").and_then(|v| v.as_array_mut()) {
                    let entry = JsonValue::String(candidate.logical_name.clone());
                    if !plugins.contains(&entry) {
                        plugins.push(entry);
                    }
                }
                continue;
            }

            let already_hash = hashes.get(candidate.kind, &candidate.logical_name).map(str::to_string);
            if already_hash.as_deref() == Some(candidate.content_hash.as_str()) {
                continue; // identical-hash install is an idempotent no-op (§8)
            }
            let is_update = already_hash.is_some();

            let rel_dst = PathBuf::from(candidate.kind.dir_name())
                .join(format!("{}.{}", candidate.logical_name, extension_for(candidate.kind)));
            let absolute_dst = path_kernel::scoped_join(
                &self.scope.root,
                &[candidate.kind.dir_name(), &format!("{}.{}", candidate.logical_name, extension_for(candidate.kind))],
            )?;

            if let Some(parent) = absolute_dst.parent() {
                if !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }

            step_index += 1;
            journal.begin_step(step_index, format!("SnapshotFile({})", rel_dst.display()))?;
            let snapshot = backups.snapshot_file(&absolute_dst, &rel_dst)?;
            journal.complete_step(Some(snapshot))?;

            step_index += 1;
            journal.begin_step(step_index, format!("CopyFile({})", rel_dst.display()))?;
            std::fs::write(&absolute_dst, &candidate.content)?;
            journal.complete_step(None)?;

            let record = InstalledRecord {
                kind: candidate.kind,
                logical_name: candidate.logical_name.clone(),
                scope: self.scope.scope,
                install_path: rel_dst,
                origin: if current_plugin.is_some() { Origin::Plugin } else { Origin::Local },
                origin_ref: current_plugin.clone(),
                content_hash: candidate.content_hash.clone(),
                installed_at: now_epoch_z(),
                version: candidate.declared_version.clone(),
            };

            apply_record_to_documents(&mut preferences, &mut engine_state, &record, candidate);
            hashes.set(candidate.kind, &candidate.logical_name, &candidate.content_hash);

            if is_update {
                updated.push(record);
            } else {
                installed.push(record);
            }
        }

        self.snapshot_document_preimages(journal, backups, &mut step_index)?;

        step_index += 1;
        journal.begin_step(step_index, "StageDocumentPatch".to_string())?;
        let staged = store::stage(self.scope, &preferences, &engine_state, &hashes)?;
        journal.complete_step(None)?;

        step_index += 1;
        journal.begin_step(step_index, "CommitDocuments".to_string())?;
        store::commit(staged)?;
        journal.complete_step(None)?;

        Ok(TransactionResult::Committed {
            installed,
            updated,
            removed: Vec::new(),
        })
    }

    /// Remove installed extensions by `(kind, logical_name)`. A Plugin
    /// removal cascades to its recorded component logical names.
    pub fn remove(&self, targets: Vec<(Kind, String)>) -> Result<TransactionResult, PaccError> {
        self.recover()?;

        let txid = new_transaction_id();
        let _lock = ScopeLock::acquire(&self.scope.lock_path(), self.config.lock_timeout())?;
        let loaded = store::load(self.scope)?;

        let mut journal = Journal::create(self.scope, &txid)?;
        let backups = BackupStore::new(self.scope, &txid)?;

        let outcome = self.execute_remove(&targets, loaded, &mut journal, &backups);

        match outcome {
            Ok(result) => {
                backups.gc()?;
                std::fs::remove_dir_all(self.scope.journal_dir(&txid))?;
                Ok(result)
            }
            Err(err) => {
                backups.restore_all(journal.reversible_actions())?;
                backups.gc()?;
                std::fs::remove_dir_all(self.scope.journal_dir(&txid))?;
                Ok(TransactionResult::Aborted {
                    phase: "execute",
                    reason: format!("[{}] {err}", err.code()),
                    diagnostics: Vec::new(),
                })
            }
        }
    }

    fn execute_remove(
        &self,
        targets: &[(Kind, String)],
        loaded: LoadedStore,
        journal: &mut Journal,
        backups: &BackupStore,
    ) -> Result<TransactionResult, PaccError> {
        let LoadedStore {
            mut preferences,
            mut engine_state,
            mut hashes,
        } = loaded;

        let mut removed = Vec::new();
        let mut step_index = 0usize;

        let expanded = self.expand_plugin_cascade(targets, &engine_state);

        for (kind, logical_name) in &expanded {
            path_kernel::validate_name(*kind, logical_name)?;

            let file_name = format!("{}.{}", logical_name, extension_for(*kind));
            let rel = PathBuf::from(kind.dir_name()).join(&file_name);
            let absolute = path_kernel::scoped_join(&self.scope.root, &[kind.dir_name(), &file_name])?;

            if absolute.is_file() {
                step_index += 1;
                journal.begin_step(step_index, format!("RemoveFile({})", rel.display()))?;
                let snapshot = backups.snapshot_removal(&absolute, &rel)?;
                std::fs::remove_file(&absolute)?;
                journal.complete_step(Some(snapshot))?;
            }

            remove_record_from_documents(&mut preferences, &mut engine_state, *kind, logical_name);
            hashes.remove(*kind, logical_name);
            removed.push(logical_name.clone());
        }

        self.snapshot_document_preimages(journal, backups, &mut step_index)?;

        step_index += 1;
        journal.begin_step(step_index, "StageDocumentPatch".to_string())?;
        let staged = store::stage(self.scope, &preferences, &engine_state, &hashes)?;
        journal.complete_step(None)?;

        step_index += 1;
        journal.begin_step(step_index, "CommitDocuments".to_string())?;
        store::commit(staged)?;
        journal.complete_step(None)?;

        Ok(TransactionResult::Committed {
            installed: Vec::new(),
            updated: Vec::new(),
            removed,
        })
    }

    /// A Plugin owns no Installed Record of its own (§6's preferences schema
    /// has no `plugins` bucket); its components carry `origin: Plugin` and
    /// `origin_ref: <plugin logical_name>` in the engine-state document, so
    /// cascade removal is a scan for matching `origin_ref`, not a manifest
    /// walk (§3: "removing a Plugin removes its children transitively").
    fn expand_plugin_cascade(&self, targets: &[(Kind, String)], engine_state: &EngineState) -> Vec<(Kind, String)> {
        let mut expanded = Vec::new();
        for (kind, logical_name) in targets {
            expanded.push((*kind, logical_name.clone()));
            if *kind != Kind::Plugin {
                continue;
            }
            for component_kind in Kind::COMPONENT_KINDS {
                let Some(bucket) = engine_state.document.get(component_kind.prefs_key()).and_then(|v| v.as_object())
                else {
                    continue;
                };
                for (component_name, record) in bucket {
                    let matches_plugin = record.get("originRef").and_then(|v| v.as_str()) == Some(logical_name.as_str());
                    if matches_plugin {
                        expanded.push((component_kind, component_name.clone()));
                    }
                }
            }
        }
        expanded
    }

    /// Reconcile the scope against a declarative target set (§8 scenario 6):
    /// installs what's missing, removes what's no longer declared, leaves
    /// matching entries untouched, then commits atomically.
    pub fn sync(&self, declared: Vec<Candidate>) -> Result<TransactionResult, PaccError> {
        self.recover()?;

        let loaded = store::load(self.scope)?;
        let declared_keys: std::collections::HashSet<(Kind, String)> = declared
            .iter()
            .map(|c| (c.kind, c.logical_name.clone()))
            .collect();

        let mut to_remove = Vec::new();
        for kind in Kind::COMPONENT_KINDS {
            if let Some(bucket) = loaded.engine_state.document.get(kind.prefs_key()).and_then(|v| v.as_object()) {
                for logical_name in bucket.keys() {
                    if !declared_keys.contains(&(kind, logical_name.clone())) {
                        to_remove.push((kind, logical_name.clone()));
                    }
                }
            }
        }

        let to_install: Vec<Candidate> = declared
            .into_iter()
            .filter(|c| {
                loaded.hashes.get(c.kind, &c.logical_name) != Some(c.content_hash.as_str())
            })
            .collect();

        if to_remove.is_empty() && to_install.is_empty() {
            return Ok(TransactionResult::Committed {
                installed: Vec::new(),
                updated: Vec::new(),
                removed: Vec::new(),
            });
        }

        if !to_remove.is_empty() {
            self.remove(to_remove)?;
        }
        if !to_install.is_empty() {
            return self.install(to_install);
        }
        Ok(TransactionResult::Committed {
            installed: Vec::new(),
            updated: Vec::new(),
            removed: Vec::new(),
        })
    }
}

fn extension_for(kind: Kind) -> &'static str {
    match kind {
        Kind::Hook | Kind::McpServer | Kind::Plugin => "json",
        Kind::Agent | Kind::Command => "md",
    }
}

fn apply_record_to_documents(
    preferences: &mut Preferences,
    engine_state: &mut EngineState,
    record: &InstalledRecord,
    candidate: &Candidate,
) {
    let prefs_bucket = preferences
        .document
        .as_object_mut()
        .and_then(|o| o.get_mut(record.kind.prefs_key()))
        .and_then(|v| v.as_object_mut());
    if let Some(bucket) = prefs_bucket {
        bucket.insert(record.logical_name.clone(), candidate.metadata.clone());
    }

    let state_bucket = engine_state
        .document
        .as_object_mut()
        .and_then(|o| o.get_mut(record.kind.prefs_key()))
        .and_then(|v| v.as_object_mut());
    if let Some(bucket) = state_bucket {
        let mut entry = Map::new();
        let origin_name = match record.origin {
            Origin::Local => "local",
            Origin::Git => "git",
            Origin::Url => "url",
            Origin::Plugin => "plugin",
        };
        entry.insert("origin".to_string(), JsonValue::String(origin_name.to_string()));
        if let Some(origin_ref) = &record.origin_ref {
            entry.insert("originRef".to_string(), JsonValue::String(origin_ref.clone()));
        }
        entry.insert("installedAt".to_string(), JsonValue::String(record.installed_at.clone()));
        if let Some(version) = &record.version {
            entry.insert("version".to_string(), JsonValue::String(version.clone()));
        }
        bucket.insert(record.logical_name.clone(), JsonValue::Object(entry));
    }
}

fn remove_record_from_documents(
    preferences: &mut Preferences,
    engine_state: &mut EngineState,
    kind: Kind,
    logical_name: &str,
) {
    if let Some(bucket) = preferences
        .document
        .as_object_mut()
        .and_then(|o| o.get_mut(kind.prefs_key()))
        .and_then(|v| v.as_object_mut())
    {
        bucket.remove(logical_name);
    }
    if let Some(bucket) = engine_state
        .document
        .as_object_mut()
        .and_then(|o| o.get_mut(kind.prefs_key()))
        .and_then(|v| v.as_object_mut())
    {
        bucket.remove(logical_name);
    }
    if kind == Kind::Plugin {
        if let Some(plugins) = preferences.document.get_mut("enabledPlugins").and_then(|v| v.as_array_mut()) {
            plugins.retain(|v| v.as_str() != Some(logical_name));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scope::Scope;
    use serde_json::json;

    fn hook_candidate(name: &str, body: JsonValue) -> Candidate {
        let content = serde_json::to_vec(&body).unwrap();
        Candidate {
            source_path: format!("{name}.json").into(),
            kind: Kind::Hook,
            logical_name: name.to_string(),
            declared_version: None,
            content_hash: crate::core::source::content_hash(&content),
            content,
            metadata: body,
        }
    }

    #[test]
    fn install_one_hook_commits_and_writes_file() {
        let tmp = tempfile::tempdir().unwrap();
        let scope = ScopeRoot::resolve(Scope::User, tmp.path()).unwrap();
        let config = EngineConfig::default();
        let orchestrator = Orchestrator::new(&scope, &config);

        let candidate = hook_candidate(
            "fmt",
            json!({"name": "fmt", "eventTypes": ["PreToolUse"], "commands": ["ruff check"]}),
        );
        let result = orchestrator.install(vec![candidate]).unwrap();
        assert!(matches!(result, TransactionResult::Committed { .. }));
        assert!(scope.root.join("hooks/fmt.json").is_file());

        let loaded = store::load(&scope).unwrap();
        assert!(loaded.preferences.document["hooks"]["fmt"].is_object());
    }

    #[test]
    fn conflicting_install_without_force_aborts_and_leaves_scope_unchanged() {
        let tmp = tempfile::tempdir().unwrap();
        let scope = ScopeRoot::resolve(Scope::User, tmp.path()).unwrap();
        let config = EngineConfig::default();
        let orchestrator = Orchestrator::new(&scope, &config);

        orchestrator
            .install(vec![hook_candidate(
                "fmt",
                json!({"name": "fmt", "eventTypes": ["PreToolUse"]}),
            )])
            .unwrap();

        let before = std::fs::read(scope.root.join("hooks/fmt.json")).unwrap();

        let result = orchestrator
            .install(vec![hook_candidate(
                "fmt",
                json!({"name": "fmt", "eventTypes": ["PostToolUse"]}),
            )])
            .unwrap();

        assert!(matches!(result, TransactionResult::Aborted { .. }));
        let after = std::fs::read(scope.root.join("hooks/fmt.json")).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn identical_hash_reinstall_is_idempotent_noop() {
        let tmp = tempfile::tempdir().unwrap();
        let scope = ScopeRoot::resolve(Scope::User, tmp.path()).unwrap();
        let config = EngineConfig::default();
        let orchestrator = Orchestrator::new(&scope, &config);

        let candidate = hook_candidate("fmt", json!({"name": "fmt", "eventTypes": ["PreToolUse"]}));
        orchestrator.install(vec![candidate.clone()]).unwrap();
        let result = orchestrator.install(vec![candidate]).unwrap();
        match result {
            TransactionResult::Committed { installed, updated, .. } => {
                assert!(installed.is_empty());
                assert!(updated.is_empty());
            }
            other => panic!("expected Committed, got {other:?}"),
        }
    }

    #[test]
    fn remove_then_reinstall_round_trips_to_empty_state() {
        let tmp = tempfile::tempdir().unwrap();
        let scope = ScopeRoot::resolve(Scope::User, tmp.path()).unwrap();
        let config = EngineConfig::default();
        let orchestrator = Orchestrator::new(&scope, &config);

        orchestrator
            .install(vec![hook_candidate("fmt", json!({"name": "fmt", "eventTypes": ["PreToolUse"]}))])
            .unwrap();
        orchestrator.remove(vec![(Kind::Hook, "fmt".to_string())]).unwrap();

        assert!(!scope.root.join("hooks/fmt.json").exists());
        let loaded = store::load(&scope).unwrap();
        assert!(loaded.preferences.document["hooks"].as_object().unwrap().is_empty());
    }

    #[test]
    fn traversal_attempt_is_rejected_before_any_side_effect() {
        let tmp = tempfile::tempdir().unwrap();
        let scope = ScopeRoot::resolve(Scope::User, tmp.path()).unwrap();
        let config = EngineConfig::default();
        let orchestrator = Orchestrator::new(&scope, &config);

        let mut candidate = hook_candidate("fmt", json!({"name": "fmt", "eventTypes": ["PreToolUse"]}));
        candidate.logical_name = "../../../etc/passwd".to_string();
        let result = orchestrator.install(vec![candidate]).unwrap();
        match result {
            TransactionResult::Aborted { phase, reason, .. } => {
                assert_eq!(phase, "execute");
                // Rejected by validate_name's charset check (NameError::Invalid),
                // not scoped_join's root-confinement check, since "/" and "."
                // are already barred from a logical name before any join happens.
                assert!(reason.contains("NAME_INVALID"), "unexpected reason: {reason}");
            }
            other => panic!("expected Aborted, got {other:?}"),
        }
        assert!(std::fs::read_dir(scope.root.join("hooks")).unwrap().next().is_none());
    }

    #[test]
    fn plugin_install_tags_components_and_cascade_removes_them() {
        let tmp = tempfile::tempdir().unwrap();
        let scope = ScopeRoot::resolve(Scope::Project, tmp.path()).unwrap();
        let config = EngineConfig::default();
        let orchestrator = Orchestrator::new(&scope, &config);

        let manifest = json!({
            "name": "linter-pack",
            "components": [
                {"kind": "hook", "path": "hooks/fmt.json"},
                {"kind": "agent", "path": "agents/reviewer.md"},
                {"kind": "command", "path": "commands/lint.md"}
            ]
        });
        let plugin_candidate = Candidate {
            source_path: "plugin.json".into(),
            kind: Kind::Plugin,
            logical_name: "linter-pack".to_string(),
            declared_version: None,
            content_hash: "plugin-hash".to_string(),
            content: serde_json::to_vec(&manifest).unwrap(),
            metadata: manifest,
        };
        let hook = hook_candidate("fmt", json!({"name": "fmt", "eventTypes": ["PreToolUse"]}));
        let agent = Candidate {
            source_path: "reviewer.md".into(),
            kind: Kind::Agent,
            logical_name: "reviewer".to_string(),
            declared_version: None,
            content_hash: "agent-hash".to_string(),
            content: b"---\nname: reviewer\ndescription: reviews\n---\nBody.".to_vec(),
            metadata: JsonValue::Null,
        };
        let command = Candidate {
            source_path: "lint.md".into(),
            kind: Kind::Command,
            logical_name: "lint".to_string(),
            declared_version: None,
            content_hash: "command-hash".to_string(),
            content: b"Runs lint.".to_vec(),
            metadata: JsonValue::Null,
        };

        let result = orchestrator
            .install(vec![plugin_candidate, hook, agent, command])
            .unwrap();
        assert!(matches!(result, TransactionResult::Committed { .. }));

        let loaded = store::load(&scope).unwrap();
        assert!(loaded
            .preferences
            .document["enabledPlugins"]
            .as_array()
            .unwrap()
            .contains(&JsonValue::String("linter-pack".to_string())));
        assert_eq!(
            loaded.engine_state.document["hooks"]["fmt"]["originRef"],
            JsonValue::String("linter-pack".to_string())
        );

        orchestrator.remove(vec![(Kind::Plugin, "linter-pack".to_string())]).unwrap();
        let after = store::load(&scope).unwrap();
        assert!(after.preferences.document["hooks"].as_object().unwrap().is_empty());
        assert!(after.preferences.document["agents"].as_object().unwrap().is_empty());
        assert!(after.preferences.document["commands"].as_object().unwrap().is_empty());
        assert!(!after.preferences.document["enabledPlugins"]
            .as_array()
            .unwrap()
            .contains(&JsonValue::String("linter-pack".to_string())));
    }
}
