//! Shared timestamp and identifier helpers.
//!
//! `installed_at` fields and transaction/journal identifiers both need a
//! monotonically-sortable, collision-resistant token; ULIDs give us both.

use ulid::Ulid;

/// Returns unix-epoch seconds with a `Z` suffix (e.g. `1771220592Z`), used for
/// `InstalledRecord::installed_at`.
pub fn now_epoch_z() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("{secs}Z")
}

/// New transaction id, used to namespace a run's journal and backup directories
/// (`engine/journal/<txid>/`, `engine/backups/<txid>/`).
pub fn new_transaction_id() -> String {
    Ulid::new().to_string()
}
