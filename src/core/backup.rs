//! Backup & restore (C4): content-addressed snapshots taken before any
//! mutating step, and deterministic reversal of a transaction's journal.

use crate::core::error::PaccError;
use crate::core::scope::ScopeRoot;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// One reversible action recorded before its corresponding mutation ran.
/// Mirrors `JournalEntry.reversible_action` (§3).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum BackupEntry {
    /// A regular file existed at `logical_path` with this content; the bytes
    /// live under `backups/<txid>/<hash>`.
    FileSnapshot { logical_path: PathBuf, hash: String },
    /// A document existed with these exact bytes, stored inline (bounded).
    DocumentSnapshot { logical_path: PathBuf, bytes: Vec<u8> },
    /// The directory at `logical_path` did not exist before the transaction.
    DirectoryCreated { logical_path: PathBuf },
    /// A file was removed; its prior content is addressable by hash.
    Removed { logical_path: PathBuf, hash: String },
    /// No file existed at `logical_path` before the transaction; rollback
    /// deletes whatever now occupies it.
    Created { logical_path: PathBuf },
}

/// Snapshot store for one transaction, rooted at `scope.backups_dir(txid)`.
pub struct BackupStore {
    txid: String,
    scope_root: PathBuf,
    backups_dir: PathBuf,
}

impl BackupStore {
    pub fn new(scope: &ScopeRoot, txid: &str) -> Result<Self, PaccError> {
        let backups_dir = scope.backups_dir(txid);
        std::fs::create_dir_all(&backups_dir)?;
        Ok(Self {
            txid: txid.to_string(),
            scope_root: scope.root.clone(),
            backups_dir,
        })
    }

    /// Snapshot a file's pre-transaction state before it is overwritten.
    /// `Created` when no file exists yet (a fresh install), so rollback after
    /// a crash mid-copy deletes the orphaned file instead of leaving it
    /// behind with no document/hash entry (§8 scenario 2).
    pub fn snapshot_file(&self, absolute_path: &Path, logical_path: &Path) -> Result<BackupEntry, PaccError> {
        if !absolute_path.exists() {
            return Ok(BackupEntry::Created {
                logical_path: logical_path.to_path_buf(),
            });
        }
        let bytes = std::fs::read(absolute_path)?;
        let hash = hex_sha256(&bytes);
        let blob_path = self.backups_dir.join(&hash);
        if !blob_path.exists() {
            std::fs::write(&blob_path, &bytes)?;
        }
        Ok(BackupEntry::FileSnapshot {
            logical_path: logical_path.to_path_buf(),
            hash,
        })
    }

    /// Snapshot a document's pre-image inline (§4.4: small, bounded).
    pub fn snapshot_bytes(&self, logical_path: &Path, bytes: Vec<u8>) -> BackupEntry {
        BackupEntry::DocumentSnapshot {
            logical_path: logical_path.to_path_buf(),
            bytes,
        }
    }

    pub fn record_directory_created(&self, logical_path: &Path) -> BackupEntry {
        BackupEntry::DirectoryCreated {
            logical_path: logical_path.to_path_buf(),
        }
    }

    pub fn snapshot_removal(&self, absolute_path: &Path, logical_path: &Path) -> Result<BackupEntry, PaccError> {
        let bytes = std::fs::read(absolute_path)?;
        let hash = hex_sha256(&bytes);
        let blob_path = self.backups_dir.join(&hash);
        if !blob_path.exists() {
            std::fs::write(&blob_path, &bytes)?;
        }
        Ok(BackupEntry::Removed {
            logical_path: logical_path.to_path_buf(),
            hash,
        })
    }

    /// Restore one entry. Idempotent: restoring onto an already-restored
    /// state is a no-op (§4.4).
    pub fn restore(&self, entry: &BackupEntry) -> Result<(), PaccError> {
        match entry {
            BackupEntry::FileSnapshot { logical_path, hash } | BackupEntry::Removed { logical_path, hash } => {
                let absolute = self.scope_root.join(logical_path);
                let blob_path = self.backups_dir.join(hash);
                let bytes = std::fs::read(&blob_path)?;
                if let Some(parent) = absolute.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&absolute, bytes)?;
            }
            BackupEntry::DocumentSnapshot { logical_path, bytes } => {
                let absolute = self.scope_root.join(logical_path);
                if let Some(parent) = absolute.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&absolute, bytes)?;
            }
            BackupEntry::DirectoryCreated { logical_path } => {
                let absolute = self.scope_root.join(logical_path);
                if absolute.is_dir() && std::fs::read_dir(&absolute)?.next().is_none() {
                    std::fs::remove_dir(&absolute)?;
                }
            }
            BackupEntry::Created { logical_path } => {
                let absolute = self.scope_root.join(logical_path);
                if absolute.is_file() {
                    std::fs::remove_file(&absolute)?;
                }
            }
        }
        Ok(())
    }

    /// Restore a full journal's worth of entries in reverse order.
    pub fn restore_all<'a>(&self, entries: impl DoubleEndedIterator<Item = &'a BackupEntry>) -> Result<(), PaccError> {
        for entry in entries.rev() {
            self.restore(entry)?;
        }
        Ok(())
    }

    /// Delete this transaction's backup directory. Called after a committed
    /// transaction no longer needs its snapshots, or after a clean rollback.
    pub fn gc(self) -> Result<(), PaccError> {
        if self.backups_dir.exists() {
            std::fs::remove_dir_all(&self.backups_dir)?;
        }
        Ok(())
    }

    pub fn txid(&self) -> &str {
        &self.txid
    }
}

fn hex_sha256(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex_encode(&digest)
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scope::Scope;

    #[test]
    fn snapshot_and_restore_file_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let scope = ScopeRoot::resolve(Scope::Project, tmp.path()).unwrap();
        let store = BackupStore::new(&scope, "01TXN").unwrap();

        let target = scope.root.join("hooks/fmt.json");
        std::fs::write(&target, b"original").unwrap();
        let entry = store.snapshot_file(&target, Path::new("hooks/fmt.json")).unwrap();

        std::fs::write(&target, b"mutated").unwrap();
        store.restore(&entry).unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"original");
    }

    #[test]
    fn restore_directory_created_removes_empty_dir_only() {
        let tmp = tempfile::tempdir().unwrap();
        let scope = ScopeRoot::resolve(Scope::Project, tmp.path()).unwrap();
        let store = BackupStore::new(&scope, "01TXN").unwrap();

        let new_dir = scope.root.join("plugins/linter-pack");
        std::fs::create_dir_all(&new_dir).unwrap();
        let entry = store.record_directory_created(Path::new("plugins/linter-pack"));
        store.restore(&entry).unwrap();

        assert!(!new_dir.exists());
    }

    #[test]
    fn restore_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let scope = ScopeRoot::resolve(Scope::Project, tmp.path()).unwrap();
        let store = BackupStore::new(&scope, "01TXN").unwrap();

        let target = scope.root.join("hooks/fmt.json");
        std::fs::write(&target, b"original").unwrap();
        let entry = store.snapshot_file(&target, Path::new("hooks/fmt.json")).unwrap();

        store.restore(&entry).unwrap();
        store.restore(&entry).unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"original");
    }

    #[test]
    fn gc_removes_backup_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let scope = ScopeRoot::resolve(Scope::Project, tmp.path()).unwrap();
        let store = BackupStore::new(&scope, "01TXN").unwrap();
        let backups_dir = scope.backups_dir("01TXN");
        assert!(backups_dir.exists());
        store.gc().unwrap();
        assert!(!backups_dir.exists());
    }
}
