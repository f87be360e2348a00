//! Scope roots: the two places PACC ever writes to.
//!
//! Mirrors the teacher's dual-store model (`User` vs `Repo`) but names the
//! variants the way the spec does (`User`/`Project`) and derives every path
//! that matters — the two structured-config documents, the lock file, the
//! per-transaction journal/backup directories, and the per-`Kind` install
//! subtree — from a single resolved root.

use crate::core::candidate::Kind;
use crate::core::error::{PaccError, PathError};
use std::path::{Path, PathBuf};

/// Directory name used under the host's home and under a project root.
pub const HOST_DIR: &str = ".pacc";

/// One of the two roots an extension can be installed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// `<user home>/.pacc/`
    User,
    /// `<project root>/.pacc/`
    Project,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::User => "user",
            Scope::Project => "project",
        }
    }
}

/// A resolved, existing scope root with all derived paths.
#[derive(Debug, Clone)]
pub struct ScopeRoot {
    pub scope: Scope,
    pub root: PathBuf,
}

impl ScopeRoot {
    /// Resolve a scope to its root directory, creating it (and the subtree
    /// `Kind` directories) if absent. `project_root` is only consulted for
    /// `Scope::Project`.
    pub fn resolve(scope: Scope, project_root: &Path) -> Result<Self, PaccError> {
        let root = match scope {
            Scope::User => dirs::home_dir()
                .ok_or_else(|| PathError::NotFound("home directory".to_string()))?
                .join(HOST_DIR),
            Scope::Project => project_root.join(HOST_DIR),
        };
        std::fs::create_dir_all(&root)?;
        let resolved = Self { scope, root };
        resolved.ensure_subtree()?;
        Ok(resolved)
    }

    fn ensure_subtree(&self) -> Result<(), PaccError> {
        for dir in [
            "hooks",
            "mcpServers",
            "agents",
            "commands",
            "plugins",
            "engine/locks",
            "engine/journal",
            "engine/backups",
        ] {
            std::fs::create_dir_all(self.root.join(dir))?;
        }
        Ok(())
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.root.join("preferences.json")
    }

    pub fn engine_state_path(&self) -> PathBuf {
        self.root.join("engine-state.json")
    }

    pub fn hashes_path(&self) -> PathBuf {
        self.root.join("engine-state.hashes.json")
    }

    pub fn lock_path(&self) -> PathBuf {
        self.root.join("engine/locks/scope.lock")
    }

    pub fn journal_dir(&self, txid: &str) -> PathBuf {
        self.root.join("engine/journal").join(txid)
    }

    pub fn backups_dir(&self, txid: &str) -> PathBuf {
        self.root.join("engine/backups").join(txid)
    }

    /// The directory a `Kind`'s install paths live under, relative to `root`.
    pub fn kind_dir(&self, kind: Kind) -> &'static str {
        kind.dir_name()
    }

    pub fn abs(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }
}
